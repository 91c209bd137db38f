use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::imaging::ImageError;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("alignment model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load alignment model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("alignment inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid alignment configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid label probabilities: {reason}")]
    InvalidScores { reason: String },

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl From<candle_core::Error> for AlignmentError {
    fn from(err: candle_core::Error) -> Self {
        AlignmentError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<EmbeddingError> for AlignmentError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::DeviceUnavailable { device, reason } => {
                AlignmentError::DeviceUnavailable { device, reason }
            }
            EmbeddingError::Image(e) => AlignmentError::Image(e),
            _ => AlignmentError::InferenceFailed {
                reason: err.to_string(),
            },
        }
    }
}
