//! CLIP image/text alignment against the fixed label pair.
//!
//! The image is scored jointly against [`LABEL_COPYRIGHTED`] and [`LABEL_FREE`];
//! a softmax over the two image→text logits gives [`AlignmentScores`].

pub mod config;
pub mod error;
pub mod types;


pub use config::ClassifierConfig;
pub use error::AlignmentError;
pub use types::{AlignmentScorer, AlignmentScores, PROBABILITY_SUM_TOLERANCE};

use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::constants::{CLIP_MEAN, CLIP_STD, LABEL_COPYRIGHTED, LABEL_FREE};
use crate::embedding::device::select_device;
use crate::embedding::utils::{load_tokenizer, weights_path};
use crate::imaging::Image;

/// Token CLIP's BPE vocabulary uses for end-of-text and padding.
const CLIP_PAD_TOKEN: &str = "<|endoftext|>";

enum ClassifierBackend {
    Model {
        model: Arc<Mutex<ClipModel>>,
        label_ids: Tensor,
        device: Device,
        image_size: u32,
    },
    Stub {
        fixed: Option<AlignmentScores>,
    },
}

pub struct AlignmentClassifier {
    backend: ClassifierBackend,
    config: ClassifierConfig,
}

impl std::fmt::Debug for AlignmentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignmentClassifier")
            .field(
                "backend",
                &match &self.backend {
                    ClassifierBackend::Model { device, .. } => format!("Model({:?})", device),
                    ClassifierBackend::Stub { fixed } => format!("Stub({:?})", fixed),
                },
            )
            .field("config", &self.config)
            .finish()
    }
}

impl AlignmentClassifier {
    pub fn load(config: ClassifierConfig) -> Result<Self, AlignmentError> {
        if let Err(msg) = config.validate() {
            return Err(AlignmentError::InvalidConfig { reason: msg });
        }

        let model_dir = match config.model_dir.clone() {
            Some(dir) => dir,
            None => {
                info!("No CLIP model configured, alignment classifier in stub mode");
                return Ok(Self {
                    backend: ClassifierBackend::Stub {
                        fixed: config.stub_scores,
                    },
                    config,
                });
            }
        };

        if !model_dir.is_dir() {
            return Err(AlignmentError::ModelNotFound { path: model_dir });
        }

        let weights = weights_path(&model_dir);
        if !weights.is_file() {
            return Err(AlignmentError::ModelLoadFailed {
                reason: format!("Missing model.safetensors in {}", model_dir.display()),
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for CLIP");

        info!(model_dir = %model_dir.display(), "Loading CLIP alignment model");

        let clip_config = ClipConfig::vit_base_patch32();
        let image_size = clip_config.image_size as u32;

        // SAFETY: the weights file is only read, and stays mapped for the model lifetime.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device) }
            .map_err(|e| AlignmentError::ModelLoadFailed {
                reason: format!("Failed to map CLIP weights: {}", e),
            })?;
        let model =
            ClipModel::new(vb, &clip_config).map_err(|e| AlignmentError::ModelLoadFailed {
                reason: format!("Failed to build CLIP model: {}", e),
            })?;

        let tokenizer =
            load_tokenizer(&model_dir).map_err(|e| AlignmentError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;
        let label_ids = tokenize_labels(&tokenizer, &[LABEL_COPYRIGHTED, LABEL_FREE], &device)?;

        info!(image_size, "CLIP alignment model loaded");

        Ok(Self {
            backend: ClassifierBackend::Model {
                model: Arc::new(Mutex::new(model)),
                label_ids,
                device,
                image_size,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, AlignmentError> {
        Self::load(ClassifierConfig::stub())
    }

    /// Scores an image against the two label phrases.
    pub fn score(&self, image: &Image) -> Result<AlignmentScores, AlignmentError> {
        let scores = match &self.backend {
            ClassifierBackend::Model {
                model,
                label_ids,
                device,
                image_size,
            } => {
                let pixel_values = image.to_clip_tensor(*image_size, CLIP_MEAN, CLIP_STD, device)?;
                let (_logits_per_text, logits_per_image) =
                    model.lock().forward(&pixel_values, label_ids).map_err(|e| {
                        AlignmentError::InferenceFailed {
                            reason: format!("CLIP forward pass failed: {}", e),
                        }
                    })?;

                // [1, 2] -> [2]
                let probs = candle_nn::ops::softmax(&logits_per_image, 1)?
                    .squeeze(0)?
                    .to_vec1::<f32>()?;
                match probs.as_slice() {
                    [copyrighted, free] => AlignmentScores::new(*copyrighted, *free)?,
                    other => {
                        return Err(AlignmentError::InferenceFailed {
                            reason: format!("expected 2 label probabilities, got {}", other.len()),
                        });
                    }
                }
            }
            ClassifierBackend::Stub { fixed: Some(fixed) } => *fixed,
            ClassifierBackend::Stub { fixed: None } => placeholder_scores(image)?,
        };

        debug!(
            copyrighted = scores.copyrighted,
            free = scores.free,
            model_loaded = self.is_model_loaded(),
            "Alignment scores computed"
        );

        Ok(scores)
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.backend, ClassifierBackend::Model { .. })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

impl AlignmentScorer for AlignmentClassifier {
    fn score(&self, image: &Image) -> Result<AlignmentScores, AlignmentError> {
        AlignmentClassifier::score(self, image)
    }
}

/// Tokenizes the label phrases into one `[labels, max_len]` id tensor, padding
/// shorter phrases with the end-of-text token.
fn tokenize_labels(
    tokenizer: &Tokenizer,
    labels: &[&str],
    device: &Device,
) -> Result<Tensor, AlignmentError> {
    let pad_id = *tokenizer.get_vocab(true).get(CLIP_PAD_TOKEN).ok_or_else(|| {
        AlignmentError::TokenizationFailed {
            reason: format!("tokenizer has no {} token", CLIP_PAD_TOKEN),
        }
    })?;

    let mut rows = Vec::with_capacity(labels.len());
    for label in labels {
        let encoding =
            tokenizer
                .encode(*label, true)
                .map_err(|e| AlignmentError::TokenizationFailed {
                    reason: e.to_string(),
                })?;
        rows.push(encoding.get_ids().to_vec());
    }

    let max_len = rows.iter().map(Vec::len).max().unwrap_or(0);
    let flat: Vec<u32> = rows
        .into_iter()
        .flat_map(|mut row| {
            row.resize(max_len, pad_id);
            row
        })
        .collect();

    Ok(Tensor::from_vec(flat, (labels.len(), max_len), device)?)
}

/// Deterministic stand-in logits derived from pixel content.
fn placeholder_scores(image: &Image) -> Result<AlignmentScores, AlignmentError> {
    let seed = image.fingerprint();
    // Two logits in [-2, 2) from disjoint halves of the fingerprint.
    let copyrighted = ((seed >> 32) as u32 as f32 / u32::MAX as f32) * 4.0 - 2.0;
    let free = ((seed & 0xFFFF_FFFF) as u32 as f32 / u32::MAX as f32) * 4.0 - 2.0;
    AlignmentScores::from_logits(copyrighted, free)
}
