use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::verdict::DecisionEngineSelector;

#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; shared by every request.
    pub engine: Arc<DecisionEngineSelector>,

    pub upload_dir: PathBuf,

    pub reference_dir: PathBuf,
}

impl AppState {
    pub fn new(engine: Arc<DecisionEngineSelector>, upload_dir: PathBuf, reference_dir: PathBuf) -> Self {
        Self {
            engine,
            upload_dir,
            reference_dir,
        }
    }

    pub fn from_config(engine: Arc<DecisionEngineSelector>, config: &Config) -> Self {
        Self::new(engine, config.upload_dir.clone(), config.reference_dir.clone())
    }
}
