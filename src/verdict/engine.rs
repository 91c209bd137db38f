use tracing::info;

use super::error::DecisionError;
use super::fusion::VerdictFusion;
use super::mock::MockDecisionEngine;
use super::types::Decision;
use crate::alignment::AlignmentScorer;
use crate::config::{Config, EngineMode};
use crate::embedding::ImageEmbedder;
use crate::imaging::ImageSource;

/// Common contract of the real and mock engines.
pub trait DecisionEngine: Send + Sync {
    fn infer(&self, source: &ImageSource) -> Result<Decision, DecisionError>;

    fn mode(&self) -> EngineMode;
}

impl<E: ImageEmbedder, A: AlignmentScorer> DecisionEngine for VerdictFusion<E, A> {
    fn infer(&self, source: &ImageSource) -> Result<Decision, DecisionError> {
        VerdictFusion::infer(self, source)
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Real
    }
}

impl DecisionEngine for MockDecisionEngine {
    /// The image is never decoded.
    fn infer(&self, _source: &ImageSource) -> Result<Decision, DecisionError> {
        Ok(self.decide())
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Mock
    }
}

/// The engine chosen once at startup.
///
/// Built by [`DecisionEngineSelector::from_config`] and shared for the life of the
/// process; there is no way to switch variants afterwards.
#[derive(Debug)]
pub enum DecisionEngineSelector {
    Real(Box<VerdictFusion>),
    Mock(MockDecisionEngine),
}

impl DecisionEngineSelector {
    /// Builds the configured engine. Real-mode model load failures are returned
    /// as [`DecisionError::StartupModelLoad`] and must stop the process.
    pub fn from_config(config: &Config) -> Result<Self, DecisionError> {
        let selector = match config.mode {
            EngineMode::Real => Self::real(VerdictFusion::from_config(config)?),
            EngineMode::Mock => Self::mock(MockDecisionEngine::new()),
        };

        info!(engine = %selector.mode(), "Decision engine selected");
        Ok(selector)
    }

    pub fn real(fusion: VerdictFusion) -> Self {
        DecisionEngineSelector::Real(Box::new(fusion))
    }

    pub fn mock(engine: MockDecisionEngine) -> Self {
        DecisionEngineSelector::Mock(engine)
    }

    pub fn mode(&self) -> EngineMode {
        match self {
            DecisionEngineSelector::Real(_) => EngineMode::Real,
            DecisionEngineSelector::Mock(_) => EngineMode::Mock,
        }
    }

    /// Entry point for callers that may not have an image at all.
    ///
    /// `None` fails with [`DecisionError::MissingImage`] before either engine runs.
    pub fn decide(&self, source: Option<&ImageSource>) -> Result<Decision, DecisionError> {
        let source = source.ok_or(DecisionError::MissingImage)?;

        let decision = match self {
            DecisionEngineSelector::Real(fusion) => fusion.infer(source)?,
            DecisionEngineSelector::Mock(mock) => DecisionEngine::infer(mock, source)?,
        };

        match decision.signals {
            Some(signals) => info!(
                engine = %decision.engine,
                verdict = %decision.verdict,
                confidence = decision.confidence.value(),
                clip_verdict = %signals.clip_verdict,
                vit_verdict = %signals.vit_verdict,
                max_similarity = signals.max_similarity,
                "Decision made"
            ),
            None => info!(
                engine = %decision.engine,
                verdict = %decision.verdict,
                confidence = decision.confidence.value(),
                "Decision made"
            ),
        }

        Ok(decision)
    }
}

impl DecisionEngine for DecisionEngineSelector {
    fn infer(&self, source: &ImageSource) -> Result<Decision, DecisionError> {
        self.decide(Some(source))
    }

    fn mode(&self) -> EngineMode {
        DecisionEngineSelector::mode(self)
    }
}
