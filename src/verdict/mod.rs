//! Verdicts and the engines that produce them.
//!
//! - [`fusion`] is the real engine (alignment OR similarity).
//! - [`mock`] is the randomized placeholder.
//! - [`engine`] holds the shared contract and the startup-time selector.

pub mod engine;
pub mod error;
pub mod fusion;
pub mod mock;
pub mod types;


pub use engine::{DecisionEngine, DecisionEngineSelector};
pub use error::DecisionError;
pub use fusion::{VerdictFusion, fuse};
pub use mock::MockDecisionEngine;
pub use types::{ConfidenceScore, Decision, FusionSignals, Verdict, round1};
