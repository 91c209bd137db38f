//! Cross-cutting, shared constants.
//!
//! Model input geometry and normalization statistics live here so the image
//! preprocessing in [`crate::imaging`] and the model wrappers in
//! [`crate::embedding`] / [`crate::alignment`] cannot drift apart.
//!
//! # Embedding Dimension
//!
//! [`VIT_EMBEDDING_DIM`] is the default width of the CLS embedding produced by
//! `google/vit-base-patch16-224`. The extractor reports its actual width at
//! runtime; use [`validate_embedding_dim`] when comparing two embeddings that
//! may come from different sources.

/// Hidden size of ViT-Base (CLS token embedding width).
pub const VIT_EMBEDDING_DIM: usize = 768;

/// Square input resolution expected by the ViT embedding model.
pub const VIT_IMAGE_SIZE: u32 = 224;

/// Per-channel mean used by the ViT feature extractor.
pub const VIT_MEAN: [f32; 3] = [0.5, 0.5, 0.5];

/// Per-channel std used by the ViT feature extractor.
pub const VIT_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Square input resolution expected by CLIP ViT-B/32.
pub const CLIP_IMAGE_SIZE: u32 = 224;

/// CLIP image normalization mean (RGB).
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP image normalization std (RGB).
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_6, 0.275_777_1];

/// Label phrase scored as "copyrighted" by the alignment classifier (index 0).
pub const LABEL_COPYRIGHTED: &str = "This image is copyrighted material";

/// Label phrase scored as "free to use" by the alignment classifier (index 1).
pub const LABEL_FREE: &str = "This image is free to use";

/// Default similarity threshold at or above which the visual signal reports infringement.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.9;

/// Lower bound of the mock engine's confidence draw.
pub const MOCK_CONFIDENCE_MIN: f32 = 50.0;

/// Upper bound of the mock engine's confidence draw.
pub const MOCK_CONFIDENCE_MAX: f32 = 99.9;

/// Error returned when two embeddings disagree on width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use copyguard::constants::{validate_embedding_dim, VIT_EMBEDDING_DIM};
///
/// validate_embedding_dim(768, VIT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(512, VIT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
