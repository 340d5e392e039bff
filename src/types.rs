//! Shared types and enums used across TOAPRO.
//! Includes `SensorFamily`, `ProductKind`, the Landsat 7 `GainState`, and the
//! Landsat 5 `CalibrationEpoch`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Byte offset of the 8-digit YYYYMMDD acquisition date inside a Landsat
/// scene identifier (e.g. `LC08_L1TP_021030_20130919_...`).
pub const SCENE_ID_DATE_OFFSET: usize = 17;

/// Sensor generations supported by the pipeline, determined from the scene
/// identifier's fixed prefix. Anything else is excluded from every list.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SensorFamily {
    L8,
    L7,
    L5,
    L4,
    S2,
}

impl SensorFamily {
    /// Detect the family from the scene identifier prefix.
    pub fn from_scene_id(id: &str) -> Option<Self> {
        if id.starts_with("LC08") {
            Some(SensorFamily::L8)
        } else if id.starts_with("LE07") {
            Some(SensorFamily::L7)
        } else if id.starts_with("LT05") {
            Some(SensorFamily::L5)
        } else if id.starts_with("LT04") {
            Some(SensorFamily::L4)
        } else if id.starts_with("L1C") {
            Some(SensorFamily::S2)
        } else {
            None
        }
    }

    /// Human-readable sensor name as it appears in the calibration report.
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorFamily::L8 => "Landsat-8 OLI",
            SensorFamily::L7 => "Landsat-7 ETM+",
            SensorFamily::L5 => "Landsat-5 TM",
            SensorFamily::L4 => "Landsat-4 TM",
            SensorFamily::S2 => "Sentinel-2 MSI",
        }
    }

    /// Raw band numbers stacked for this family, in stack order.
    pub fn band_numbers(&self) -> &'static [u32] {
        match self {
            SensorFamily::L8 => &[1, 2, 3, 4, 5, 6, 7],
            SensorFamily::L7 | SensorFamily::L5 | SensorFamily::L4 => &[1, 2, 3, 4, 5, 7],
            SensorFamily::S2 => &[2, 3, 4, 8],
        }
    }

    /// Band numbers carrying reflective calibration coefficients, in
    /// coefficient order. Empty for Sentinel-2 (no radiometric rescale).
    pub fn reflective_band_numbers(&self) -> &'static [u32] {
        match self {
            SensorFamily::L8 => &[2, 3, 4, 5, 6, 7],
            SensorFamily::L7 | SensorFamily::L5 | SensorFamily::L4 => &[1, 2, 3, 4, 5, 7],
            SensorFamily::S2 => &[],
        }
    }

    /// Storage keyword for the DN stack output node.
    pub fn stack_storage(&self) -> &'static str {
        match self {
            SensorFamily::L8 | SensorFamily::S2 => "16 BIT UNSIGNED INTEGER",
            SensorFamily::L7 | SensorFamily::L5 | SensorFamily::L4 => "8 BIT UNSIGNED INTEGER",
        }
    }

    /// Whether DNs must be rescaled to radiance before TOA reflectance.
    /// Sentinel-2 L1C bands are already reflectance-scaled.
    pub fn has_radiometric_rescale(&self) -> bool {
        !matches!(self, SensorFamily::S2)
    }
}

impl std::fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SensorFamily::L8 => "L8",
            SensorFamily::L7 => "L7",
            SensorFamily::L5 => "L5",
            SensorFamily::L4 => "L4",
            SensorFamily::S2 => "S2",
        };
        write!(f, "{}", s)
    }
}

/// Output products the pipeline can plan for a scene.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ProductKind {
    Stack,
    Toa,
    Ndvi,
    Wdri,
    Msavi,
}

impl ProductKind {
    /// All products, in planning order. The stack feeds TOA, which feeds the
    /// indices for Landsat scenes.
    pub fn all() -> &'static [ProductKind] {
        &[
            ProductKind::Stack,
            ProductKind::Toa,
            ProductKind::Ndvi,
            ProductKind::Wdri,
            ProductKind::Msavi,
        ]
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProductKind::Stack => "Stack",
            ProductKind::Toa => "Toa",
            ProductKind::Ndvi => "Ndvi",
            ProductKind::Wdri => "Wdri",
            ProductKind::Msavi => "Msavi",
        };
        write!(f, "{}", s)
    }
}

/// Landsat 7 per-band amplifier setting, resolved from the metadata
/// radiance maximum.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GainState {
    High,
    Low,
}

impl std::fmt::Display for GainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GainState::High => write!(f, "High"),
            GainState::Low => write!(f, "Low"),
        }
    }
}

/// Landsat 5 calibration epoch for bands 1-2, selected by acquisition year.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CalibrationEpoch {
    /// Acquired 1984-1991 inclusive.
    Pre,
    /// Acquired 1992 or later.
    Post,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_from_prefix() {
        assert_eq!(
            SensorFamily::from_scene_id("LC08_L1TP_021030_20130919_20170308_01_T1"),
            Some(SensorFamily::L8)
        );
        assert_eq!(
            SensorFamily::from_scene_id("LE07_L1TP_021030_20110501_20200908_02_T1"),
            Some(SensorFamily::L7)
        );
        assert_eq!(
            SensorFamily::from_scene_id("LT05_L1TP_021030_19870712_20170101_01_T1"),
            Some(SensorFamily::L5)
        );
        assert_eq!(
            SensorFamily::from_scene_id("LT04_L1TP_021030_19890719_20170101_01_T1"),
            Some(SensorFamily::L4)
        );
        assert_eq!(
            SensorFamily::from_scene_id("L1C_T16TDL_A020821_20190604T164859"),
            Some(SensorFamily::S2)
        );
    }

    #[test]
    fn unknown_prefix_is_excluded() {
        assert_eq!(SensorFamily::from_scene_id("MOD09GA_A2013262"), None);
        assert_eq!(SensorFamily::from_scene_id(""), None);
    }

    #[test]
    fn band_layout_is_fixed_per_family() {
        assert_eq!(SensorFamily::L8.band_numbers().len(), 7);
        assert_eq!(SensorFamily::L7.band_numbers(), &[1, 2, 3, 4, 5, 7]);
        assert_eq!(SensorFamily::S2.band_numbers(), &[2, 3, 4, 8]);
        assert_eq!(SensorFamily::L8.reflective_band_numbers().len(), 6);
        assert_eq!(SensorFamily::L5.reflective_band_numbers().len(), 6);
        assert!(SensorFamily::S2.reflective_band_numbers().is_empty());
    }
}
