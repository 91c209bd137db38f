use std::path::PathBuf;
use thiserror::Error;

use crate::imaging::ImageError;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("vision model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load vision model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("invalid embedding model configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
