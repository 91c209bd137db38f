use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::imaging::ImageError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("reference image {path} is unreadable: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("embedding width mismatch for {path}: expected {expected}, got {actual}")]
    DimensionMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("reference corpus {path} cannot be listed: {source}")]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
