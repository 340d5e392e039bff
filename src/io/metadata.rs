//! Scene metadata (MTL) document reader.
//!
//! An MTL document is line-based ASCII, one `LABEL = value` pair per line.
//! Field extraction follows the reference convention: find the first line
//! containing the label, then take the value substring at a fixed trailing
//! offset from the end of the line and strip whitespace, quotes, and units.
//! Labels for numbered bands include a trailing space so `..._BAND_1` never
//! matches `..._BAND_10`.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors encountered while reading scene metadata. All variants are
/// scene-local: the batch continues without the scene.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata document unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    #[error("missing field `{0}` in scene metadata")]
    MissingField(String),
    #[error("malformed value for `{label}`: {value}")]
    Malformed { label: String, value: String },
}

/// One scene's metadata document, held as raw lines.
#[derive(Debug, Clone)]
pub struct MetadataDoc {
    lines: Vec<String>,
}

impl MetadataDoc {
    /// Read a metadata document from disk. A missing or unreadable file
    /// yields `Unavailable` for this scene only.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!("read metadata document: {:?}", path.as_ref());
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        MetadataDoc {
            lines: text.lines().map(|l| l.to_string()).collect(),
        }
    }

    /// Raw field lookup: the last `len` characters of the first line
    /// containing `label`, after dropping `skip` characters from the end.
    /// The result is trimmed of whitespace, quotes, and unit suffixes.
    pub fn tail_field(&self, label: &str, skip: usize, len: usize) -> Result<String, MetadataError> {
        let line = self
            .lines
            .iter()
            .find(|l| l.contains(label))
            .ok_or_else(|| MetadataError::MissingField(label.trim().to_string()))?;
        let chars: Vec<char> = line.trim_end().chars().collect();
        let stop = chars.len().saturating_sub(skip);
        let start = stop.saturating_sub(len);
        let raw: String = chars[start..stop].iter().collect();
        Ok(raw.trim().trim_matches('"').to_string())
    }

    /// Numeric field lookup via `tail_field`.
    pub fn tail_value(&self, label: &str, skip: usize, len: usize) -> Result<f64, MetadataError> {
        let raw = self.tail_field(label, skip, len)?;
        raw.parse().map_err(|_| MetadataError::Malformed {
            label: label.trim().to_string(),
            value: raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
  GROUP = RADIOMETRIC_RESCALING
    RADIANCE_MULT_BAND_1 = 1.2863E-02
    RADIANCE_MULT_BAND_2 = 1.2623E-02
    RADIANCE_ADD_BAND_2 = -63.11709
    RADIANCE_MAXIMUM_BAND_1 = 191.600
  END_GROUP = RADIOMETRIC_RESCALING
    SUN_ELEVATION = 48.36084282
    EARTH_SUN_DISTANCE = 1.0051872
    DATE_ACQUIRED = 2011-05-01
";

    #[test]
    fn trailing_offset_extraction() {
        let doc = MetadataDoc::from_text(SAMPLE);
        assert_eq!(
            doc.tail_field("RADIANCE_MULT_BAND_2 ", 0, 10).unwrap(),
            "1.2623E-02"
        );
        assert_eq!(
            doc.tail_field("RADIANCE_ADD_BAND_2 ", 0, 9).unwrap(),
            "-63.11709"
        );
        assert_eq!(doc.tail_field("SUN_ELEVATION", 0, 11).unwrap(), "48.36084282");
        assert_eq!(doc.tail_field("EARTH_SUN_DISTANCE", 0, 9).unwrap(), "1.0051872");
    }

    #[test]
    fn skip_drops_characters_from_the_end() {
        let doc = MetadataDoc::from_text(SAMPLE);
        // Radiance maximum keeps six characters after dropping the final one,
        // so 191.600 compares as 191.60 against the gain reference.
        assert_eq!(
            doc.tail_field("RADIANCE_MAXIMUM_BAND_1 ", 1, 6).unwrap(),
            "191.60"
        );
        // Acquisition year: drop the -MM-DD tail, keep four digits.
        assert_eq!(doc.tail_field("DATE_ACQUIRED", 6, 4).unwrap(), "2011");
    }

    #[test]
    fn numbered_label_with_trailing_space_is_exact() {
        let doc = MetadataDoc::from_text(SAMPLE);
        // Matches band 2, not band 20 (absent here, but the space is load-bearing).
        assert_eq!(doc.tail_value("RADIANCE_MULT_BAND_2 ", 0, 10).unwrap(), 1.2623e-2);
    }

    #[test]
    fn missing_field_is_a_result_not_a_panic() {
        let doc = MetadataDoc::from_text(SAMPLE);
        assert!(matches!(
            doc.tail_field("REFLECTANCE_MULT_BAND_2 ", 0, 10),
            Err(MetadataError::MissingField(_))
        ));
    }

    #[test]
    fn malformed_value_reports_label_and_text() {
        let doc = MetadataDoc::from_text("    SUN_ELEVATION = not-a-number");
        assert!(matches!(
            doc.tail_value("SUN_ELEVATION", 0, 11),
            Err(MetadataError::Malformed { .. })
        ));
    }

    #[test]
    fn unreadable_document_is_unavailable() {
        let err = MetadataDoc::read("/nonexistent/LT50000000000000_MTL.txt").unwrap_err();
        assert!(matches!(err, MetadataError::Unavailable(_)));
    }
}
