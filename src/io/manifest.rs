//! Immutable scene manifest: the hand-off from scene discovery to the
//! planning core.
//!
//! A manifest is either discovered by scanning the immediate subdirectories
//! of a root (a directory qualifies as a scene when it holds the family's
//! first band file) or deserialized from JSON written by an external
//! discovery front-end. The core never mutates the filesystem while reading
//! it; band sets and metadata paths are derived from the per-family naming
//! conventions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{ProductKind, SensorFamily};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One scene: identifier, family, and the directory holding its band files
/// and metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub id: String,
    pub family: SensorFamily,
    pub dir: PathBuf,
}

impl SceneEntry {
    /// Build an entry from a scene identifier and its data directory,
    /// deriving the family from the identifier prefix.
    pub fn new(id: impl Into<String>, dir: impl Into<PathBuf>) -> crate::error::Result<Self> {
        let id = id.into();
        let family = SensorFamily::from_scene_id(&id)
            .ok_or_else(|| crate::error::Error::UnrecognizedSensor { id: id.clone() })?;
        Ok(SceneEntry {
            id,
            family,
            dir: dir.into(),
        })
    }

    /// Ordered, fixed-length band file paths following the family's naming
    /// convention: `<sceneid>_b<n>.tif` for Landsat, `<sceneid>_B0n.jp2`
    /// for Sentinel-2.
    pub fn band_files(&self) -> Vec<PathBuf> {
        self.family
            .band_numbers()
            .iter()
            .map(|b| self.dir.join(self.band_file_name(*b)))
            .collect()
    }

    fn band_file_name(&self, band: u32) -> String {
        match self.family {
            SensorFamily::S2 => format!("{}_B{band:02}.jp2", self.id),
            _ => format!("{}_b{band}.tif", self.id),
        }
    }

    /// The scene's metadata document. Sentinel-2 scenes carry none.
    pub fn metadata_file(&self) -> Option<PathBuf> {
        match self.family {
            SensorFamily::S2 => None,
            _ => Some(self.dir.join(format!("{}_MTL.txt", self.id))),
        }
    }

    /// Where a product's job description and invocation descriptor are
    /// written, next to the scene's raw data.
    pub fn job_file(&self, kind: ProductKind) -> PathBuf {
        self.dir.join(format!("{}{}", self.id, job_suffix(kind, Stage::Graph)))
    }

    pub fn descriptor_file(&self, kind: ProductKind) -> PathBuf {
        self.dir
            .join(format!("{}{}", self.id, job_suffix(kind, Stage::Descriptor)))
    }
}

enum Stage {
    Graph,
    Descriptor,
}

/// Reference file-name suffixes for the two job stages.
fn job_suffix(kind: ProductKind, stage: Stage) -> &'static str {
    match (kind, stage) {
        (ProductKind::Stack, Stage::Graph) => "_parameter_stackA",
        (ProductKind::Stack, Stage::Descriptor) => "_parameter_stackB",
        (ProductKind::Toa, Stage::Graph) => "_atmcorrParamA",
        (ProductKind::Toa, Stage::Descriptor) => "_atmcorrParamB",
        (ProductKind::Ndvi, Stage::Graph) => "_ndvi_paramA",
        (ProductKind::Ndvi, Stage::Descriptor) => "_ndvi_paramB",
        (ProductKind::Wdri, Stage::Graph) => "_wdri_paramA",
        (ProductKind::Wdri, Stage::Descriptor) => "_wdri_paramB",
        (ProductKind::Msavi, Stage::Graph) => "_msavi_paramA",
        (ProductKind::Msavi, Stage::Descriptor) => "_msavi_paramB",
    }
}

/// Immutable list of scenes, in discovery or file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneManifest {
    pub scenes: Vec<SceneEntry>,
}

impl SceneManifest {
    /// Load a manifest previously written by a discovery front-end.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Scan the immediate subdirectories of `root` for scene folders. A
    /// directory qualifies when its name maps to a known sensor family and
    /// its first band file is present; identifiers matching no family are
    /// silently excluded.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self, ManifestError> {
        let mut scenes = Vec::new();
        let mut entries: Vec<PathBuf> = fs::read_dir(root.as_ref())?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        // Directory iteration order is platform-dependent; sort for a
        // reproducible manifest.
        entries.sort();

        for dir in entries {
            let Some(id) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let scene = match SceneEntry::new(id, &dir) {
                Ok(scene) => scene,
                Err(_) => {
                    debug!("excluding unrecognized identifier: {id}");
                    continue;
                }
            };
            let band_files = scene.band_files();
            let first_band = &band_files[0];
            if !first_band.exists() {
                debug!("excluding {id}: first band file missing ({first_band:?})");
                continue;
            }
            scenes.push(scene);
        }
        info!("discovered {} scene(s)", scenes.len());
        Ok(SceneManifest { scenes })
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }
}

/// Product directories under the output base. Created up front; product
/// paths drive the idempotence check (an existing target skips its job).
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub base: PathBuf,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        OutputLayout {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// Create every product directory.
    pub fn prepare(&self) -> std::io::Result<()> {
        for dir in ["Stacks", "Toa_ref", "NDVI", "WDRI", "MSAVI"] {
            fs::create_dir_all(self.base.join(dir))?;
        }
        Ok(())
    }

    /// Target artifact for a scene/product pair.
    pub fn product_file(&self, kind: ProductKind, scene_id: &str) -> PathBuf {
        let (dir, suffix) = match kind {
            ProductKind::Stack => ("Stacks", "_stack.img"),
            ProductKind::Toa => ("Toa_ref", "_toa.img"),
            ProductKind::Ndvi => ("NDVI", "_ndvi.img"),
            ProductKind::Wdri => ("WDRI", "_wdri.img"),
            ProductKind::Msavi => ("MSAVI", "_msavi.img"),
        };
        self.base.join(dir).join(format!("{scene_id}{suffix}"))
    }

    /// Batch list handed to the engine.
    pub fn batch_file(&self) -> PathBuf {
        self.base.join("atm_batch_process.bat")
    }

    /// Calibration report document.
    pub fn report_file(&self) -> PathBuf {
        self.base.join("Report.txt")
    }
}
