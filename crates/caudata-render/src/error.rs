use caudata_core::CaudataError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to draw {artifact}: {reason}")]
    Plot { artifact: String, reason: String },

    #[error("Nothing to draw for {artifact}: {reason}")]
    EmptyLayer { artifact: String, reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RenderError {
    pub(crate) fn plot(artifact: &Path, err: impl std::fmt::Display) -> Self {
        RenderError::Plot { artifact: artifact.display().to_string(), reason: err.to_string() }
    }

    pub(crate) fn empty(artifact: &Path, reason: impl Into<String>) -> Self {
        RenderError::EmptyLayer { artifact: artifact.display().to_string(), reason: reason.into() }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<RenderError> for CaudataError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Plot { artifact, reason } | RenderError::EmptyLayer { artifact, reason } => {
                CaudataError::Render { artifact, reason }
            }
            RenderError::Image(e) => CaudataError::Render { artifact: "image".to_string(), reason: e.to_string() },
            RenderError::Io(e) => CaudataError::Io(e),
            RenderError::Serialization(reason) => CaudataError::Serialization(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
