use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{ConfidenceScore, Decision, Verdict};
use crate::config::EngineMode;
use crate::constants::{MOCK_CONFIDENCE_MAX, MOCK_CONFIDENCE_MIN};

/// Placeholder engine: a coin-flip verdict with a random confidence.
///
/// Output carries no meaning. It exists so the service can run without model
/// weights, and is always tagged [`EngineMode::Mock`].
pub struct MockDecisionEngine {
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for MockDecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDecisionEngine").finish_non_exhaustive()
    }
}

impl Default for MockDecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDecisionEngine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn decide(&self) -> Decision {
        let mut rng = self.rng.lock();
        let verdict = if rng.gen_bool(0.5) {
            Verdict::Infringed
        } else {
            Verdict::NoIssue
        };
        let confidence =
            ConfidenceScore::from_percent(rng.gen_range(MOCK_CONFIDENCE_MIN..=MOCK_CONFIDENCE_MAX));

        Decision {
            verdict,
            confidence,
            engine: EngineMode::Mock,
            signals: None,
        }
    }
}
