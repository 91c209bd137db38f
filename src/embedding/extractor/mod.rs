//! ViT image embedder (safetensors + config.json).
//!
//! Use [`ExtractorConfig::stub`] for tests/examples without model files.

/// Extractor configuration.
pub mod config;

#[cfg(test)]
mod tests;

pub use config::{EXTRACTOR_EMBEDDING_DIM, ExtractorConfig};

use std::path::Path;
use std::sync::Arc;

use candle_core::Device;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::constants::{VIT_MEAN, VIT_STD};
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::types::{Embedding, ImageEmbedder};
use crate::embedding::vit::VitEncoder;
use crate::imaging::Image;

enum ExtractorBackend {
    Model {
        model: Arc<Mutex<VitEncoder>>,
        device: Device,
    },
    Stub,
}

/// Turns an image into its ViT CLS embedding (supports stub mode).
///
/// The loaded model sits behind a mutex: concurrent callers are serialized
/// rather than assuming the backend is reentrant.
pub struct EmbeddingExtractor {
    backend: ExtractorBackend,
    config: ExtractorConfig,
    embedding_dim: usize,
    image_size: u32,
}

impl std::fmt::Debug for EmbeddingExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingExtractor")
            .field(
                "backend",
                &match &self.backend {
                    ExtractorBackend::Model { device, .. } => format!("Model({:?})", device),
                    ExtractorBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.embedding_dim)
            .field("image_size", &self.image_size)
            .finish()
    }
}

impl EmbeddingExtractor {
    /// Loads the extractor from a config (stub mode is supported).
    pub fn load(config: ExtractorConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Embedding extractor running in STUB mode (testing only)");
            return Ok(Self {
                backend: ExtractorBackend::Stub,
                embedding_dim: config.embedding_dim,
                image_size: crate::constants::VIT_IMAGE_SIZE,
                config,
            });
        }

        if !config.model_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.model_dir.clone(),
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for ViT");

        let model = VitEncoder::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load ViT model: {}", e),
            }
        })?;

        let embedding_dim = model.config().hidden_size;
        let image_size = model.config().image_size as u32;

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim,
            image_size,
            num_layers = model.config().num_hidden_layers,
            "ViT embedding model loaded"
        );

        Ok(Self {
            backend: ExtractorBackend::Model {
                model: Arc::new(Mutex::new(model)),
                device,
            },
            config,
            embedding_dim,
            image_size,
        })
    }

    /// Shorthand for `load(ExtractorConfig::stub())`.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(ExtractorConfig::stub())
    }

    /// Embeds a decoded image.
    pub fn embed(&self, image: &Image) -> Result<Embedding, EmbeddingError> {
        match &self.backend {
            ExtractorBackend::Model { model, device } => self.embed_with_model(image, model, device),
            ExtractorBackend::Stub => Ok(self.embed_stub(image)),
        }
    }

    /// Decodes a file and embeds it.
    pub fn embed_path<P: AsRef<Path>>(&self, path: P) -> Result<Embedding, EmbeddingError> {
        let image = Image::open(path)?;
        self.embed(&image)
    }

    fn embed_with_model(
        &self,
        image: &Image,
        model: &Arc<Mutex<VitEncoder>>,
        device: &Device,
    ) -> Result<Embedding, EmbeddingError> {
        let pixel_values = image
            .to_tensor(self.image_size, VIT_MEAN, VIT_STD, device)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Failed to build pixel tensor: {}", e),
            })?;

        debug!(
            width = image.width(),
            height = image.height(),
            "Generating embedding (ViT forward pass)"
        );

        let cls = model
            .lock()
            .embed_cls(&pixel_values)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("ViT forward pass failed: {}", e),
            })?;

        let values = cls
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Failed to read CLS embedding: {}", e),
            })?;

        Ok(Embedding::new(values))
    }

    fn embed_stub(&self, image: &Image) -> Embedding {
        let seed = image.fingerprint();
        debug!(seed, "Generating stub embedding");

        let mut state = seed;
        let values = (0..self.embedding_dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();

        Embedding::new(values)
    }

    /// Returns the output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, ExtractorBackend::Stub)
    }

    /// Returns the extractor configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }
}

impl ImageEmbedder for EmbeddingExtractor {
    fn embed(&self, image: &Image) -> Result<Embedding, EmbeddingError> {
        EmbeddingExtractor::embed(self, image)
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}
