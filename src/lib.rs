//! Copyguard library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Decision engines
//! - [`DecisionEngineSelector`] - real or mock engine, chosen once from [`Config`]
//! - [`VerdictFusion`] - CLIP alignment OR ViT similarity, fused into one [`Decision`]
//! - [`MockDecisionEngine`] - randomized placeholder
//!
//! ## Signals
//! - [`EmbeddingExtractor`] - ViT CLS embeddings
//! - [`SimilarityScanner`] - max cosine similarity over a [`ReferenceCorpus`]
//! - [`AlignmentClassifier`] - P(copyrighted) vs P(free) from CLIP
//!
//! ## HTTP
//! - [`gateway::create_router`] - `/check_copyright`, `/healthz`, `/ready`
//!
//! ## Test/Mock Support
//! Fixtures in [`testing`] are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod alignment;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod imaging;
pub mod similarity;
#[cfg(any(test, feature = "mock"))]
pub mod testing;
pub mod verdict;

pub use alignment::{
    AlignmentClassifier, AlignmentError, AlignmentScorer, AlignmentScores, ClassifierConfig,
};
pub use config::{Config, ConfigError, EngineMode};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{
    EXTRACTOR_EMBEDDING_DIM, Embedding, EmbeddingError, EmbeddingExtractor, ExtractorConfig,
    ImageEmbedder, cosine_similarity,
};
pub use hashing::{hash_file_content, hash_pixels};
pub use imaging::{Image, ImageError, ImageSource};
pub use similarity::{
    ReferenceCorpus, ReferenceIndex, ScanError, ScanPolicy, ScanReport, SimilarityScanner,
};
pub use verdict::{
    ConfidenceScore, Decision, DecisionEngine, DecisionEngineSelector, DecisionError,
    FusionSignals, MockDecisionEngine, Verdict, VerdictFusion,
};
