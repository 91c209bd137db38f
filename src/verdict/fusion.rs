//! Real engine: CLIP alignment OR ViT similarity.

use tracing::{debug, info};

use super::error::DecisionError;
use super::types::{ConfidenceScore, Decision, FusionSignals, Verdict};
use crate::alignment::{AlignmentClassifier, AlignmentScorer, AlignmentScores, ClassifierConfig};
use crate::config::{Config, EngineMode};
use crate::embedding::{EmbeddingExtractor, ExtractorConfig, ImageEmbedder};
use crate::imaging::{Image, ImageSource};
use crate::similarity::{ReferenceCorpus, ReferenceIndex, ScanPolicy, SimilarityScanner};

/// Merges the two partial signals into one decision.
///
/// Either signal alone triggers `Infringed`. An infringement takes the stronger
/// of the two confidences; a clean result takes the weaker, using
/// `1 - max_similarity` as the visual signal's no-issue strength.
pub fn fuse(scores: &AlignmentScores, max_similarity: f32, threshold: f32) -> Decision {
    let clip_verdict = scores.verdict();
    let clip_confidence = scores.confidence();
    let vit_verdict = if max_similarity >= threshold {
        Verdict::Infringed
    } else {
        Verdict::NoIssue
    };

    let (verdict, confidence) = if clip_verdict.is_infringed() || vit_verdict.is_infringed() {
        (
            Verdict::Infringed,
            clip_confidence.max(ConfidenceScore::from_fraction(max_similarity)),
        )
    } else {
        (
            Verdict::NoIssue,
            clip_confidence.min(ConfidenceScore::from_fraction(1.0 - max_similarity)),
        )
    };

    Decision {
        verdict,
        confidence,
        engine: EngineMode::Real,
        signals: Some(FusionSignals {
            clip_verdict,
            clip_confidence,
            vit_verdict,
            max_similarity,
        }),
    }
}

pub struct VerdictFusion<E: ImageEmbedder = EmbeddingExtractor, A: AlignmentScorer = AlignmentClassifier>
{
    classifier: A,
    scanner: SimilarityScanner<E>,
    threshold: f32,
}

impl<E: ImageEmbedder, A: AlignmentScorer> std::fmt::Debug for VerdictFusion<E, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerdictFusion")
            .field("scanner", &self.scanner)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl VerdictFusion {
    /// Loads both models from the configured directories.
    ///
    /// Any failure is a [`DecisionError::StartupModelLoad`]; there is no stub fallback.
    pub fn from_config(config: &Config) -> Result<Self, DecisionError> {
        let vit_path =
            config
                .vit_model_path
                .as_ref()
                .ok_or_else(|| DecisionError::StartupModelLoad {
                    reason: "no ViT model path configured".to_string(),
                })?;
        let clip_path =
            config
                .clip_model_path
                .as_ref()
                .ok_or_else(|| DecisionError::StartupModelLoad {
                    reason: "no CLIP model path configured".to_string(),
                })?;

        info!(vit = %vit_path.display(), clip = %clip_path.display(), "Loading real decision engine");

        let extractor = EmbeddingExtractor::load(ExtractorConfig::new(vit_path)).map_err(|e| {
            DecisionError::StartupModelLoad {
                reason: e.to_string(),
            }
        })?;
        let classifier = AlignmentClassifier::load(ClassifierConfig::new(clip_path)).map_err(|e| {
            DecisionError::StartupModelLoad {
                reason: e.to_string(),
            }
        })?;

        let mut scanner =
            SimilarityScanner::new(extractor, ReferenceCorpus::new(&config.reference_dir))
                .with_policy(ScanPolicy::from_skip_flag(config.skip_unreadable));
        if config.reference_cache {
            info!("Reference embedding index enabled");
            scanner = scanner.with_index(ReferenceIndex::new());
        }

        Ok(Self::new(classifier, scanner, config.similarity_threshold))
    }
}

impl<E: ImageEmbedder, A: AlignmentScorer> VerdictFusion<E, A> {
    pub fn new(classifier: A, scanner: SimilarityScanner<E>, threshold: f32) -> Self {
        Self {
            classifier,
            scanner,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn scanner(&self) -> &SimilarityScanner<E> {
        &self.scanner
    }

    pub fn classifier(&self) -> &A {
        &self.classifier
    }

    /// Decodes the source, then runs [`Self::infer_image`].
    pub fn infer(&self, source: &ImageSource) -> Result<Decision, DecisionError> {
        let image = source.load()?;
        self.infer_image(&image)
    }

    /// Runs both signals (always both) and fuses them.
    pub fn infer_image(&self, image: &Image) -> Result<Decision, DecisionError> {
        let scores = self.classifier.score(image)?;
        let report = self.scanner.scan(image)?;

        debug!(
            p_copyrighted = scores.copyrighted,
            p_free = scores.free,
            max_similarity = report.max_similarity,
            compared = report.compared,
            threshold = self.threshold,
            "Fusing alignment and similarity signals"
        );

        Ok(fuse(&scores, report.max_similarity, self.threshold))
    }
}
