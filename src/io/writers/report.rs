//! Calibration report writer.
//!
//! A read-only projection over the resolved scenes: counts by sensor family,
//! the scene-identifier listing, then one coefficient block per Landsat
//! scene with its per-band gains and biases, sun elevation, and earth-sun
//! distance. Sentinel-2 scenes appear in the counts and listing only; they
//! carry no rescale coefficients. No new values are computed here.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::core::processing::calibration::SceneCalibration;
use crate::error::Result;
use crate::types::SensorFamily;

/// One resolved scene as the report sees it.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub scene_id: String,
    pub family: SensorFamily,
    pub calibration: SceneCalibration,
}

/// Families in report order, mirroring the processing order.
const FAMILY_ORDER: [SensorFamily; 5] = [
    SensorFamily::L8,
    SensorFamily::L7,
    SensorFamily::L5,
    SensorFamily::L4,
    SensorFamily::S2,
];

pub fn render(entries: &[ReportEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "The number of images being processed = {}\n",
        entries.len()
    ));
    for family in FAMILY_ORDER {
        let count = entries.iter().filter(|e| e.family == family).count();
        out.push_str(&format!("{} {} images\n", count, family.display_name()));
    }
    out.push_str("\n\nImage IDs: \n");
    for family in FAMILY_ORDER {
        for entry in entries.iter().filter(|e| e.family == family) {
            out.push_str(&entry.scene_id);
            out.push('\n');
        }
    }

    for family in FAMILY_ORDER {
        for entry in entries.iter().filter(|e| e.family == family) {
            let SceneCalibration::Rescaled {
                coefficients,
                geometry,
            } = &entry.calibration
            else {
                continue;
            };
            out.push_str(&format!("\n\n{} Parameters are...\n", entry.scene_id));

            let (gain_label, bias_label) = match family {
                SensorFamily::L8 => (
                    "Radiance multiplicative rescaling factors: ",
                    "Radiance additive rescaling factors: ",
                ),
                _ => ("Gain rescaling factors: ", "Bias rescaling factors: "),
            };
            let bands = family.reflective_band_numbers();

            out.push_str(gain_label);
            out.push('\n');
            for (band, gain) in bands.iter().zip(coefficients.gains) {
                out.push_str(&format!("Band {band}: {gain}\n"));
            }
            out.push('\n');
            out.push_str(bias_label);
            out.push('\n');
            for (band, bias) in bands.iter().zip(coefficients.biases) {
                out.push_str(&format!("Band {band}: {bias}\n"));
            }
            out.push('\n');
            out.push_str(&format!("Sun elevation angle = {}\n", geometry.sun_elevation));
            out.push_str(&format!(
                "Earth-sun distance = {}\n",
                geometry.earth_sun_distance
            ));
        }
    }
    out
}

pub fn write(path: &Path, entries: &[ReportEntry]) -> Result<()> {
    fs::write(path, render(entries))?;
    info!("wrote calibration report for {} scene(s): {:?}", entries.len(), path);
    Ok(())
}
