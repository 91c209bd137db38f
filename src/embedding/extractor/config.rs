use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default extractor output dimension (ViT-Base hidden size).
pub const EXTRACTOR_EMBEDDING_DIM: usize = crate::constants::VIT_EMBEDDING_DIM;

#[derive(Debug, Clone)]
/// Configuration for [`EmbeddingExtractor`](super::EmbeddingExtractor).
pub struct ExtractorConfig {
    /// ViT model directory (`config.json` + `model.safetensors`).
    pub model_dir: PathBuf,
    /// Embedding width used by the stub backend.
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            embedding_dim: EXTRACTOR_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl ExtractorConfig {
    /// Creates a config for a ViT model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; embeddings derived from pixel content).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Overrides the stub embedding width.
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        Ok(())
    }

    /// Returns `true` if both `config.json` and `model.safetensors` exist.
    pub fn model_available(&self) -> bool {
        !self.model_dir.as_os_str().is_empty()
            && self.model_dir.join("config.json").is_file()
            && self.model_dir.join("model.safetensors").is_file()
    }
}
