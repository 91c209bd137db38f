//! Visual embedding models.
//!
//! - [`extractor`] turns an image into a ViT CLS embedding.
//! - [`vit`] is the candle implementation of the ViT backbone.

/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// ViT embedding extractor.
pub mod extractor;
mod types;
/// Model-directory and tokenizer loading helpers.
pub mod utils;
/// ViT backbone.
pub mod vit;

pub use error::EmbeddingError;
pub use extractor::{EXTRACTOR_EMBEDDING_DIM, EmbeddingExtractor, ExtractorConfig};
pub use types::{Embedding, ImageEmbedder, cosine_similarity};
