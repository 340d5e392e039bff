use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Manifest error: {0}")]
    Manifest(#[from] toapro::io::ManifestError),

    #[error(transparent)]
    Core(#[from] toapro::Error),
}
