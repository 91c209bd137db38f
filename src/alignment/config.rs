use std::path::PathBuf;

use super::error::AlignmentError;
use super::types::AlignmentScores;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// CLIP model directory (`model.safetensors` + `tokenizer.json`).
    pub model_dir: Option<PathBuf>,

    /// Fixed output for stub mode; `None` derives scores from pixel content.
    pub stub_scores: Option<AlignmentScores>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::stub()
    }
}

impl ClassifierConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            stub_scores: None,
        }
    }

    pub fn stub() -> Self {
        Self {
            model_dir: None,
            stub_scores: None,
        }
    }

    /// Stub that always returns `P(copyrighted) = copyrighted, P(free) = free`.
    pub fn stub_with_scores(copyrighted: f32, free: f32) -> Result<Self, AlignmentError> {
        Ok(Self {
            model_dir: None,
            stub_scores: Some(AlignmentScores::new(copyrighted, free)?),
        })
    }

    pub fn is_stub(&self) -> bool {
        self.model_dir.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.model_dir
            && path.as_os_str().is_empty()
        {
            return Err("model_dir cannot be empty when provided".to_string());
        }

        if self.model_dir.is_some() && self.stub_scores.is_some() {
            return Err("stub_scores only apply when no model_dir is set".to_string());
        }

        Ok(())
    }
}
