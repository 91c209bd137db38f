//! Spawns the real router on an ephemeral port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use copyguard::alignment::{AlignmentClassifier, ClassifierConfig};
use copyguard::embedding::EmbeddingExtractor;
use copyguard::gateway::{AppState, create_router};
use copyguard::similarity::{ReferenceCorpus, SimilarityScanner};
use copyguard::verdict::{DecisionEngineSelector, MockDecisionEngine, VerdictFusion};

pub enum TestEngine {
    Mock,
    /// Real fusion pipeline over stub models with fixed CLIP probabilities.
    StubReal { copyrighted: f32, free: f32 },
}

pub struct TestServerConfig {
    pub engine: TestEngine,
    pub threshold: f32,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            engine: TestEngine::Mock,
            threshold: 0.9,
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    _root: TempDir,
    pub upload_dir: PathBuf,
    pub reference_dir: PathBuf,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let root = TempDir::new()?;
    let upload_dir = root.path().join("uploads");
    let reference_dir = root.path().join("reference_images");
    std::fs::create_dir(&upload_dir)?;
    std::fs::create_dir(&reference_dir)?;

    let engine = match config.engine {
        TestEngine::Mock => DecisionEngineSelector::mock(MockDecisionEngine::with_seed(99)),
        TestEngine::StubReal { copyrighted, free } => {
            let classifier = AlignmentClassifier::load(ClassifierConfig::stub_with_scores(
                copyrighted,
                free,
            )?)?;
            let scanner = SimilarityScanner::new(
                EmbeddingExtractor::stub()?,
                ReferenceCorpus::new(&reference_dir),
            );
            DecisionEngineSelector::real(VerdictFusion::new(classifier, scanner, config.threshold))
        }
    };

    let state = AppState::new(Arc::new(engine), upload_dir.clone(), reference_dir.clone());
    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        addr,
        _root: root,
        upload_dir,
        reference_dir,
    })
}
