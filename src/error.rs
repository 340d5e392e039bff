//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O and metadata errors, and provides semantic variants
//! for scene validation and planning failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Metadata(#[from] crate::io::MetadataError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] crate::io::ManifestError),

    #[error("Unrecognized sensor for scene identifier: {id}")]
    UnrecognizedSensor { id: String },

    #[error("Invalid scene identifier `{id}`: {reason}")]
    InvalidSceneId { id: String, reason: &'static str },

    #[error("Engine error: {0}")]
    Engine(String),
}

impl Error {
    pub fn engine<E: std::fmt::Display>(e: E) -> Self {
        Error::Engine(e.to_string())
    }
}
