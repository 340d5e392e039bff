//! Solar geometry helpers: acquisition-date extraction from scene identifiers,
//! day-of-year computation, and the earth-sun distance lookup.
//!
//! The day-of-year calculation deliberately uses the reference leap rule
//! (divisible by 4, no century correction). The downstream distance table was
//! tuned against this rule, so it is preserved rather than corrected.

use crate::error::{Error, Result};
use crate::types::SCENE_ID_DATE_OFFSET;

use super::distance::EARTH_SUN_DISTANCE_AU;

/// Cumulative days before each month, common year.
const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Calendar date extracted from a Landsat scene identifier.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AcquisitionDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl AcquisitionDate {
    /// Parse the 8-digit YYYYMMDD date embedded at the fixed offset of a
    /// Landsat scene identifier.
    pub fn from_scene_id(id: &str) -> Result<Self> {
        let digits = id
            .get(SCENE_ID_DATE_OFFSET..SCENE_ID_DATE_OFFSET + 8)
            .ok_or(Error::InvalidSceneId {
                id: id.to_string(),
                reason: "identifier too short to carry an acquisition date",
            })?;
        let numeric = |s: &str| -> Result<u32> {
            s.parse().map_err(|_| Error::InvalidSceneId {
                id: id.to_string(),
                reason: "acquisition date field is not numeric",
            })
        };
        let year = numeric(&digits[0..4])? as i32;
        let month = numeric(&digits[4..6])?;
        let day = numeric(&digits[6..8])?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(Error::InvalidSceneId {
                id: id.to_string(),
                reason: "acquisition date out of range",
            });
        }
        Ok(AcquisitionDate { year, month, day })
    }

    pub fn day_of_year(&self) -> u32 {
        day_of_year(self.year, self.month, self.day)
    }
}

/// Day of year in [1, 366] under the simplified divisible-by-4 leap rule.
pub fn day_of_year(year: i32, month: u32, day: u32) -> u32 {
    let mut doy = DAYS_BEFORE_MONTH[(month - 1) as usize] + day;
    if year % 4 == 0 && month > 2 {
        doy += 1;
    }
    doy
}

/// Earth-sun distance in AU for the given day of year.
///
/// DOY outside [1, 366] is a programming error, never a recoverable
/// condition: fail fast.
pub fn earth_sun_distance(doy: u32) -> f64 {
    assert!((1..=366).contains(&doy), "day of year out of range: {doy}");
    EARTH_SUN_DISTANCE_AU[(doy - 1) as usize]
}
