use std::path::PathBuf;
use thiserror::Error;

use crate::alignment::AlignmentError;
use crate::embedding::EmbeddingError;
use crate::imaging::ImageError;
use crate::similarity::ScanError;

/// Request-level failure of a decision engine.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// No image was handed to the engine. Raised before any model runs.
    #[error("no image supplied")]
    MissingImage,

    /// The query or a reference image could not be decoded.
    #[error("image could not be decoded: {source}")]
    ImageDecode {
        /// Set when the failing image is a reference file.
        path: Option<PathBuf>,
        #[source]
        source: ImageError,
    },

    #[error("model inference failed: {reason}")]
    ModelInference { reason: String },

    #[error("reference corpus {path} unavailable: {source}")]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The real engine could not load its models. Fatal at startup.
    #[error("failed to load models at startup: {reason}")]
    StartupModelLoad { reason: String },
}

impl DecisionError {
    /// Whether the caller supplied bad input, as opposed to a server-side failure.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DecisionError::MissingImage | DecisionError::ImageDecode { path: None, .. }
        )
    }
}

impl From<ImageError> for DecisionError {
    fn from(source: ImageError) -> Self {
        DecisionError::ImageDecode { path: None, source }
    }
}

impl From<EmbeddingError> for DecisionError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Image(source) => DecisionError::ImageDecode { path: None, source },
            other => DecisionError::ModelInference {
                reason: other.to_string(),
            },
        }
    }
}

impl From<AlignmentError> for DecisionError {
    fn from(err: AlignmentError) -> Self {
        match err {
            AlignmentError::Image(source) => DecisionError::ImageDecode { path: None, source },
            other => DecisionError::ModelInference {
                reason: other.to_string(),
            },
        }
    }
}

impl From<ScanError> for DecisionError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Image { path, source } => DecisionError::ImageDecode {
                path: Some(path),
                source,
            },
            ScanError::Embedding(e) => e.into(),
            ScanError::DimensionMismatch { .. } => DecisionError::ModelInference {
                reason: err.to_string(),
            },
            ScanError::CorpusUnavailable { path, source } => {
                DecisionError::CorpusUnavailable { path, source }
            }
        }
    }
}
