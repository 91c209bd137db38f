use serde::Serialize;

use super::error::AlignmentError;
use crate::verdict::{ConfidenceScore, Verdict};

/// Allowed drift of `copyrighted + free` from `1.0`.
pub const PROBABILITY_SUM_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Probability distribution over the two label phrases.
pub struct AlignmentScores {
    /// P("This image is copyrighted material").
    pub copyrighted: f32,
    /// P("This image is free to use").
    pub free: f32,
}

impl AlignmentScores {
    /// Wraps an existing distribution, rejecting anything that is not one.
    pub fn new(copyrighted: f32, free: f32) -> Result<Self, AlignmentError> {
        let in_unit = |p: f32| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_unit(copyrighted) || !in_unit(free) {
            return Err(AlignmentError::InvalidScores {
                reason: format!(
                    "probabilities must lie in [0, 1], got ({}, {})",
                    copyrighted, free
                ),
            });
        }

        let sum = copyrighted + free;
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(AlignmentError::InvalidScores {
                reason: format!("probabilities must sum to 1.0, got {}", sum),
            });
        }

        Ok(Self { copyrighted, free })
    }

    /// Softmax over the two label logits.
    pub fn from_logits(copyrighted: f32, free: f32) -> Result<Self, AlignmentError> {
        if !copyrighted.is_finite() || !free.is_finite() {
            return Err(AlignmentError::InvalidScores {
                reason: format!("non-finite logits ({}, {})", copyrighted, free),
            });
        }

        let max = copyrighted.max(free);
        let ec = (copyrighted - max).exp();
        let ef = (free - max).exp();
        let total = ec + ef;
        Self::new(ec / total, ef / total)
    }

    pub fn as_array(&self) -> [f32; 2] {
        [self.copyrighted, self.free]
    }

    /// `Infringed` iff P(copyrighted) is strictly greater than P(free).
    pub fn verdict(&self) -> Verdict {
        if self.copyrighted > self.free {
            Verdict::Infringed
        } else {
            Verdict::NoIssue
        }
    }

    /// The larger probability as a percentage, rounded to one decimal.
    pub fn confidence(&self) -> ConfidenceScore {
        ConfidenceScore::from_fraction(self.copyrighted.max(self.free))
    }
}

/// Anything that can score an image against the label pair.
pub trait AlignmentScorer: Send + Sync {
    fn score(&self, image: &crate::imaging::Image) -> Result<AlignmentScores, AlignmentError>;
}

impl<T: AlignmentScorer + ?Sized> AlignmentScorer for std::sync::Arc<T> {
    fn score(&self, image: &crate::imaging::Image) -> Result<AlignmentScores, AlignmentError> {
        (**self).score(image)
    }
}
