use crate::embedding::error::EmbeddingError;
use crate::imaging::Image;

/// Fixed-length visual embedding of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    /// Cosine similarity with another embedding (see [`cosine_similarity`]).
    pub fn cosine(&self, other: &Embedding) -> f32 {
        cosine_similarity(&self.0, &other.0)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// `(a·b) / (|a||b|)`, clamped to `[-1, 1]`.
///
/// Accumulates in `f64` so identical vectors compare as exactly `1.0`.
/// Mismatched lengths, empty inputs and zero vectors yield `0.0`.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
                let av = av as f64;
                let bv = bv as f64;
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        ((dot / (norm_a * norm_b)) as f32).clamp(-1.0, 1.0)
    }
}

/// Anything that can turn a decoded image into an [`Embedding`].
///
/// Implementations must be deterministic for fixed weights and safe to share
/// across request threads.
pub trait ImageEmbedder: Send + Sync {
    fn embed(&self, image: &Image) -> Result<Embedding, EmbeddingError>;

    /// Width of every embedding this embedder produces.
    fn embedding_dim(&self) -> usize;
}

impl<T: ImageEmbedder + ?Sized> ImageEmbedder for std::sync::Arc<T> {
    fn embed(&self, image: &Image) -> Result<Embedding, EmbeddingError> {
        (**self).embed(image)
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }
}
