use std::fmt;

use serde::Serialize;

use crate::config::EngineMode;

/// Terminal answer for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    #[serde(rename = "Copyright Infringed")]
    Infringed,
    #[serde(rename = "No Issue")]
    NoIssue,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Infringed => "Copyright Infringed",
            Verdict::NoIssue => "No Issue",
        }
    }

    pub fn is_infringed(&self) -> bool {
        matches!(self, Verdict::Infringed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds to one decimal place, halves to even.
#[inline]
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Percentage in `[0, 100]` with one decimal of precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ConfidenceScore(f32);

impl ConfidenceScore {
    /// Rounds a percentage to one decimal, clamping into `[0, 100]`.
    pub fn from_percent(percent: f32) -> Self {
        if percent.is_nan() {
            return Self(0.0);
        }
        Self(round1(percent).clamp(0.0, 100.0))
    }

    /// `round(fraction * 100, 1)`.
    pub fn from_fraction(fraction: f32) -> Self {
        Self::from_percent(fraction * 100.0)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 { other } else { self }
    }

    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 { other } else { self }
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// The two partial signals the real engine fused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionSignals {
    pub clip_verdict: Verdict,
    pub clip_confidence: ConfidenceScore,
    pub vit_verdict: Verdict,
    pub max_similarity: f32,
}

/// Output of a decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub confidence: ConfidenceScore,
    /// Which engine produced this.
    pub engine: EngineMode,
    /// Present only for [`EngineMode::Real`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<FusionSignals>,
}
