//! Content-addressed reference embeddings.
//!
//! Keys are BLAKE3 digests of the reference file bytes, so an edited file misses
//! and a removed file is simply never asked for again.

use moka::sync::Cache;

use crate::embedding::Embedding;

/// In-memory map from reference file content to its embedding.
#[derive(Clone)]
pub struct ReferenceIndex {
    entries: Cache<[u8; 32], Embedding>,
}

impl std::fmt::Debug for ReferenceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceIndex")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl Default for ReferenceIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceIndex {
    const DEFAULT_CAPACITY: u64 = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    #[inline]
    pub fn get(&self, content_hash: &[u8; 32]) -> Option<Embedding> {
        self.entries.get(content_hash)
    }

    #[inline]
    pub fn insert(&self, content_hash: [u8; 32], embedding: Embedding) {
        self.entries.insert(content_hash, embedding);
    }

    /// Number of indexed references (approximate until pending tasks run).
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}
