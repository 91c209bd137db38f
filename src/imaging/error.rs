use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image input is empty")]
    Empty,

    #[error("failed to decode image: {reason}")]
    Decode {
        path: Option<PathBuf>,
        reason: String,
    },

    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImageError {
    /// Attaches a file path to a decode error that was produced from in-memory bytes.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ImageError::Decode { reason, .. } => {
                let path = path.into();
                ImageError::Decode {
                    reason: format!("{}: {}", path.display(), reason),
                    path: Some(path),
                }
            }
            other => other,
        }
    }
}
