//! Nearest-reference visual similarity.
//!
//! [`SimilarityScanner::scan`] embeds the query once, then walks the whole
//! [`ReferenceCorpus`] and keeps the highest cosine similarity. Without a
//! [`ReferenceIndex`] every reference is decoded and embedded again on every call.

pub mod corpus;
pub mod error;
pub mod index;


pub use corpus::{ReferenceCorpus, ScanPolicy};
pub use error::ScanError;
pub use index::ReferenceIndex;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::{DimValidationError, validate_embedding_dim};
use crate::embedding::{Embedding, EmbeddingExtractor, ImageEmbedder};
use crate::hashing::hash_file_content;
use crate::imaging::{Image, ImageError};

/// Result of one full corpus scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    /// Highest cosine similarity seen, floored at `0.0`.
    ///
    /// Nothing compared and only anti-correlated references both report `0.0`.
    pub max_similarity: f32,
    /// References actually compared against the query.
    pub compared: usize,
    /// References skipped under [`ScanPolicy::SkipUnreadable`].
    pub skipped: usize,
    /// Reference with the highest raw cosine similarity.
    pub best_match: Option<PathBuf>,
}

impl ScanReport {
    fn empty() -> Self {
        Self {
            max_similarity: 0.0,
            compared: 0,
            skipped: 0,
            best_match: None,
        }
    }
}

pub struct SimilarityScanner<E: ImageEmbedder = EmbeddingExtractor> {
    embedder: E,
    corpus: ReferenceCorpus,
    policy: ScanPolicy,
    index: Option<ReferenceIndex>,
}

impl<E: ImageEmbedder> std::fmt::Debug for SimilarityScanner<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityScanner")
            .field("corpus", &self.corpus)
            .field("policy", &self.policy)
            .field("index", &self.index)
            .finish()
    }
}

impl<E: ImageEmbedder> SimilarityScanner<E> {
    pub fn new(embedder: E, corpus: ReferenceCorpus) -> Self {
        Self {
            embedder,
            corpus,
            policy: ScanPolicy::default(),
            index: None,
        }
    }

    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reuses reference embeddings across scans, keyed by file content.
    pub fn with_index(mut self, index: ReferenceIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn corpus(&self) -> &ReferenceCorpus {
        &self.corpus
    }

    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    pub fn index(&self) -> Option<&ReferenceIndex> {
        self.index.as_ref()
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Maximum cosine similarity between `query` and every reference image.
    pub fn scan(&self, query: &Image) -> Result<ScanReport, ScanError> {
        let query_embedding = self.embedder.embed(query)?;
        let references = self.corpus.entries()?;

        if references.is_empty() {
            debug!(dir = %self.corpus.dir().display(), "Reference corpus empty");
            return Ok(ScanReport::empty());
        }

        let mut report = ScanReport::empty();
        let mut best: Option<f32> = None;

        for path in references {
            let reference = match self.reference_embedding(&path) {
                Ok(embedding) => embedding,
                Err(ScanError::Image { path, source })
                    if self.policy == ScanPolicy::SkipUnreadable =>
                {
                    warn!(path = %path.display(), error = %source, "Skipping unreadable reference image");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            validate_embedding_dim(reference.dim(), query_embedding.dim()).map_err(
                |e| match e {
                    DimValidationError::DimensionMismatch { expected, actual } => {
                        ScanError::DimensionMismatch {
                            path: path.clone(),
                            expected,
                            actual,
                        }
                    }
                    DimValidationError::ZeroDimension => ScanError::DimensionMismatch {
                        path: path.clone(),
                        expected: query_embedding.dim(),
                        actual: reference.dim(),
                    },
                },
            )?;

            let similarity = query_embedding.cosine(&reference);
            report.compared += 1;

            if best.is_none_or(|b| similarity > b) {
                best = Some(similarity);
                report.best_match = Some(path);
            }
        }

        report.max_similarity = best.unwrap_or(0.0).max(0.0);

        debug!(
            max_similarity = report.max_similarity,
            compared = report.compared,
            skipped = report.skipped,
            "Reference scan complete"
        );

        Ok(report)
    }

    fn reference_embedding(&self, path: &Path) -> Result<Embedding, ScanError> {
        let bytes = std::fs::read(path).map_err(|source| ScanError::Image {
            path: path.to_path_buf(),
            source: ImageError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let Some(index) = &self.index else {
            return self.embed_reference(path, &bytes);
        };

        let key = hash_file_content(&bytes);
        if let Some(hit) = index.get(&key) {
            return Ok(hit);
        }

        let embedding = self.embed_reference(path, &bytes)?;
        index.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn embed_reference(&self, path: &Path, bytes: &[u8]) -> Result<Embedding, ScanError> {
        let image = Image::from_bytes(bytes).map_err(|e| ScanError::Image {
            path: path.to_path_buf(),
            source: e.with_path(path),
        })?;
        Ok(self.embedder.embed(&image)?)
    }
}
