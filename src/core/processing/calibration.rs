//! Sensor profile resolver: per-band calibration coefficients and solar
//! geometry for each sensor family.
//!
//! Landsat 8 reads its radiance rescale pairs and geometry straight from the
//! metadata document. Landsat 7 selects per-band high/low gain pairs by
//! comparing the metadata radiance maximum against fixed high-gain
//! references. Landsat 5 switches bands 1-2 between pre- and post-1992
//! calibration constants by acquisition year, and Landsat 4 switches band 1
//! by the truncated radiance maximum. Sentinel-2 bands arrive already
//! reflectance-scaled and carry no rescale at all.

use tracing::debug;

use crate::error::Result;
use crate::io::metadata::MetadataDoc;
use crate::types::{CalibrationEpoch, GainState, SensorFamily};

use super::solar::{self, AcquisitionDate};

/// Reflective band count shared by every calibrated Landsat family.
pub const REFLECTIVE_BANDS: usize = 6;

/// Exo-atmospheric solar irradiance per reflective band, in sensor order.
pub const ESUN_L8: [f64; REFLECTIVE_BANDS] = [2067.0, 1893.0, 1603.0, 972.6, 245.0, 79.72];
pub const ESUN_L7: [f64; REFLECTIVE_BANDS] = [1997.0, 1812.0, 1533.0, 1039.0, 230.8, 84.9];
pub const ESUN_L5: [f64; REFLECTIVE_BANDS] = [1983.0, 1796.0, 1536.0, 1031.0, 220.0, 83.44];
pub const ESUN_L4: [f64; REFLECTIVE_BANDS] = [1983.0, 1795.0, 1539.0, 1028.0, 219.8, 83.49];

/// Post-calibration dynamic range maxima identifying Landsat 7 high gain,
/// compared for exact equality against the metadata radiance maximum.
const L7_HIGH_GAIN_RADIANCE_MAX: [f64; REFLECTIVE_BANDS] =
    [191.60, 196.50, 152.90, 157.40, 31.06, 10.80];
const L7_GAIN_LOW: [f64; REFLECTIVE_BANDS] =
    [1.180709, 1.209843, 0.942520, 0.969291, 0.191220, 0.066496];
const L7_GAIN_HIGH: [f64; REFLECTIVE_BANDS] =
    [0.778740, 0.798819, 0.621654, 0.639764, 0.126220, 0.043898];
const L7_BIAS_LOW: [f64; REFLECTIVE_BANDS] = [-7.38, -7.61, -5.94, -6.07, -1.19, -0.42];
const L7_BIAS_HIGH: [f64; REFLECTIVE_BANDS] = [-6.98, -7.20, -5.62, -5.74, -1.13, -0.39];

/// Landsat 5 bands 1-2, pre (1984-1991) and post calibration epochs; bands
/// 3-6 never changed.
const L5_GAIN_PRE: [f64; 2] = [0.671339, 0.1322205];
const L5_GAIN_POST: [f64; 2] = [0.765827, 1.448189];
const L5_GAIN_FIXED: [f64; 4] = [1.043976, 0.876024, 0.120354, 0.065551];
const L5_BIAS_PRE: [f64; 2] = [-2.19, -4.16];
const L5_BIAS_POST: [f64; 2] = [-2.29, -4.29];
const L5_BIAS_FIXED: [f64; 4] = [-2.21, -2.39, -0.49, -0.22];

/// Landsat 4 band 1, old vs. new calibration; bands 2-6 fixed. The old
/// calibration is identified by a truncated radiance maximum of 163.
const L4_OLD_CALIBRATION_LMAX: i64 = 163;
const L4_GAIN_OLD: f64 = 0.647717;
const L4_GAIN_NEW: f64 = 0.679213;
const L4_BIAS_OLD: f64 = -2.17;
const L4_BIAS_NEW: f64 = -2.20;
const L4_GAIN_FIXED: [f64; 5] = [1.334016, 1.004606, 0.876024, 0.125079, 0.065945];
const L4_BIAS_FIXED: [f64; 5] = [-4.17, -2.17, -2.39, -0.50, -0.22];

/// Per-scene solar geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarGeometry {
    /// Sun elevation angle in degrees.
    pub sun_elevation: f64,
    /// Earth-sun distance in astronomical units.
    pub earth_sun_distance: f64,
}

/// Resolved per-band radiance rescale pairs plus the fixed ESUN table.
/// Immutable once resolved; consumed exactly once per scene.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCoefficients {
    pub gains: [f64; REFLECTIVE_BANDS],
    pub biases: [f64; REFLECTIVE_BANDS],
    pub esun: [f64; REFLECTIVE_BANDS],
}

/// Outcome of profile resolution for one scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCalibration {
    /// DNs need the radiance rescale and TOA conversion (all Landsat).
    Rescaled {
        coefficients: CalibrationCoefficients,
        geometry: SolarGeometry,
    },
    /// Bands are consumed as-is (Sentinel-2).
    Reflectance,
}

impl SceneCalibration {
    pub fn coefficients(&self) -> Option<&CalibrationCoefficients> {
        match self {
            SceneCalibration::Rescaled { coefficients, .. } => Some(coefficients),
            SceneCalibration::Reflectance => None,
        }
    }

    pub fn geometry(&self) -> Option<SolarGeometry> {
        match self {
            SceneCalibration::Rescaled { geometry, .. } => Some(*geometry),
            SceneCalibration::Reflectance => None,
        }
    }
}

/// Resolve calibration for one scene. A missing or malformed required field
/// surfaces as an error; the caller excludes the scene from every downstream
/// stage, so no partial per-band output is ever produced.
pub fn resolve(family: SensorFamily, scene_id: &str, doc: Option<&MetadataDoc>) -> Result<SceneCalibration> {
    match family {
        SensorFamily::S2 => Ok(SceneCalibration::Reflectance),
        SensorFamily::L8 => {
            let doc = require_doc(doc, scene_id)?;
            resolve_l8(doc)
        }
        SensorFamily::L7 => {
            let doc = require_doc(doc, scene_id)?;
            resolve_l7(doc, scene_id)
        }
        SensorFamily::L5 => {
            let doc = require_doc(doc, scene_id)?;
            resolve_l5(doc, scene_id)
        }
        SensorFamily::L4 => {
            let doc = require_doc(doc, scene_id)?;
            resolve_l4(doc, scene_id)
        }
    }
}

fn require_doc<'a>(doc: Option<&'a MetadataDoc>, scene_id: &str) -> Result<&'a MetadataDoc> {
    doc.ok_or_else(|| {
        crate::io::MetadataError::MissingField(format!("metadata document for {scene_id}")).into()
    })
}

fn resolve_l8(doc: &MetadataDoc) -> Result<SceneCalibration> {
    let mut gains = [0.0; REFLECTIVE_BANDS];
    let mut biases = [0.0; REFLECTIVE_BANDS];
    for (i, band) in (2..=7).enumerate() {
        gains[i] = doc.tail_value(&format!("RADIANCE_MULT_BAND_{band} "), 0, 10)?;
        biases[i] = doc.tail_value(&format!("RADIANCE_ADD_BAND_{band} "), 0, 9)?;
    }
    let geometry = SolarGeometry {
        sun_elevation: doc.tail_value("SUN_ELEVATION", 0, 11)?,
        earth_sun_distance: doc.tail_value("EARTH_SUN_DISTANCE", 0, 9)?,
    };
    Ok(SceneCalibration::Rescaled {
        coefficients: CalibrationCoefficients {
            gains,
            biases,
            esun: ESUN_L8,
        },
        geometry,
    })
}

/// Gain state for one Landsat 7 band: the metadata radiance maximum equals
/// the high-gain reference exactly, or the band is low gain.
fn l7_gain_state(band_index: usize, radiance_max: f64) -> GainState {
    if radiance_max == L7_HIGH_GAIN_RADIANCE_MAX[band_index] {
        GainState::High
    } else {
        GainState::Low
    }
}

fn resolve_l7(doc: &MetadataDoc, scene_id: &str) -> Result<SceneCalibration> {
    let mut gains = [0.0; REFLECTIVE_BANDS];
    let mut biases = [0.0; REFLECTIVE_BANDS];
    for (i, band) in SensorFamily::L7.reflective_band_numbers().iter().enumerate() {
        let radiance_max = doc.tail_value(&format!("RADIANCE_MAXIMUM_BAND_{band} "), 1, 6)?;
        let state = l7_gain_state(i, radiance_max);
        debug!(band = *band, %state, radiance_max, "L7 gain state");
        let (gain, bias) = match state {
            GainState::High => (L7_GAIN_HIGH[i], L7_BIAS_HIGH[i]),
            GainState::Low => (L7_GAIN_LOW[i], L7_BIAS_LOW[i]),
        };
        gains[i] = gain;
        biases[i] = bias;
    }
    Ok(SceneCalibration::Rescaled {
        coefficients: CalibrationCoefficients {
            gains,
            biases,
            esun: ESUN_L7,
        },
        geometry: table_geometry(doc, scene_id)?,
    })
}

/// Landsat 5 calibration epoch for bands 1-2 by acquisition year.
fn l5_epoch(year: i32) -> CalibrationEpoch {
    if (1984..=1991).contains(&year) {
        CalibrationEpoch::Pre
    } else {
        CalibrationEpoch::Post
    }
}

fn resolve_l5(doc: &MetadataDoc, scene_id: &str) -> Result<SceneCalibration> {
    let year = doc.tail_value("DATE_ACQUIRED", 6, 4)? as i32;
    let (head_gains, head_biases) = match l5_epoch(year) {
        CalibrationEpoch::Pre => (L5_GAIN_PRE, L5_BIAS_PRE),
        CalibrationEpoch::Post => (L5_GAIN_POST, L5_BIAS_POST),
    };
    let mut gains = [0.0; REFLECTIVE_BANDS];
    let mut biases = [0.0; REFLECTIVE_BANDS];
    gains[..2].copy_from_slice(&head_gains);
    gains[2..].copy_from_slice(&L5_GAIN_FIXED);
    biases[..2].copy_from_slice(&head_biases);
    biases[2..].copy_from_slice(&L5_BIAS_FIXED);
    Ok(SceneCalibration::Rescaled {
        coefficients: CalibrationCoefficients {
            gains,
            biases,
            esun: ESUN_L5,
        },
        geometry: table_geometry(doc, scene_id)?,
    })
}

fn resolve_l4(doc: &MetadataDoc, scene_id: &str) -> Result<SceneCalibration> {
    let lmax = doc.tail_value("RADIANCE_MAXIMUM_BAND_1 ", 4, 3)? as i64;
    let (head_gain, head_bias) = if lmax == L4_OLD_CALIBRATION_LMAX {
        (L4_GAIN_OLD, L4_BIAS_OLD)
    } else {
        (L4_GAIN_NEW, L4_BIAS_NEW)
    };
    let mut gains = [0.0; REFLECTIVE_BANDS];
    let mut biases = [0.0; REFLECTIVE_BANDS];
    gains[0] = head_gain;
    gains[1..].copy_from_slice(&L4_GAIN_FIXED);
    biases[0] = head_bias;
    biases[1..].copy_from_slice(&L4_BIAS_FIXED);
    Ok(SceneCalibration::Rescaled {
        coefficients: CalibrationCoefficients {
            gains,
            biases,
            esun: ESUN_L4,
        },
        geometry: table_geometry(doc, scene_id)?,
    })
}

/// Geometry for the table-driven families: sun elevation from metadata,
/// distance from the DOY table via the scene's acquisition date.
fn table_geometry(doc: &MetadataDoc, scene_id: &str) -> Result<SolarGeometry> {
    let sun_elevation = doc.tail_value("SUN_ELEVATION", 0, 11)?;
    let doy = AcquisitionDate::from_scene_id(scene_id)?.day_of_year();
    Ok(SolarGeometry {
        sun_elevation,
        earth_sun_distance: solar::earth_sun_distance(doy),
    })
}
