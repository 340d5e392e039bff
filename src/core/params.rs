use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::ProductKind;

/// Processing parameters suitable for config files and front-end presets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingParams {
    /// Products to plan per scene, in dependency order
    pub products: Vec<ProductKind>,
    /// Plan scenes on the rayon thread pool; output order stays deterministic
    pub parallel: bool,
    /// Invoke the engine after emitting the batch list
    pub run_engine: bool,
    /// Spatial-modeler executable written into the batch list
    pub modeler: PathBuf,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            products: ProductKind::all().to_vec(),
            parallel: false,
            run_engine: false,
            modeler: PathBuf::from("modeler"),
        }
    }
}
