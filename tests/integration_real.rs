//! Tests against real model weights.
//!
//! Run with `COPYGUARD_VIT_MODEL_PATH` and `COPYGUARD_CLIP_MODEL_PATH` set and
//! `--ignored`.

use tempfile::TempDir;

use copyguard::testing::{png_bytes, write_png};
use copyguard::{Config, DecisionEngineSelector, EngineMode, ImageSource, Verdict};

fn real_config(reference_dir: &std::path::Path) -> Config {
    Config {
        mode: EngineMode::Real,
        vit_model_path: std::env::var("COPYGUARD_VIT_MODEL_PATH").ok().map(Into::into),
        clip_model_path: std::env::var("COPYGUARD_CLIP_MODEL_PATH").ok().map(Into::into),
        reference_dir: reference_dir.to_path_buf(),
        ..Config::default()
    }
}

#[test]
#[ignore]
fn test_real_engine_identical_reference() {
    let refs = TempDir::new().unwrap();
    write_png(refs.path(), "known.png", [180, 40, 90]);

    let selector = DecisionEngineSelector::from_config(&real_config(refs.path()))
        .expect("models should load");
    assert_eq!(selector.mode(), EngineMode::Real);

    let d = selector
        .decide(Some(&ImageSource::Bytes(png_bytes([180, 40, 90]))))
        .unwrap();
    let signals = d.signals.unwrap();
    assert!((signals.max_similarity - 1.0).abs() < 1e-4);
    assert_eq!(d.verdict, Verdict::Infringed);
    assert_eq!(d.confidence.value(), 100.0);
}

#[test]
#[ignore]
fn test_real_engine_empty_corpus() {
    let refs = TempDir::new().unwrap();
    let selector = DecisionEngineSelector::from_config(&real_config(refs.path()))
        .expect("models should load");

    let d = selector
        .decide(Some(&ImageSource::Bytes(png_bytes([20, 20, 20]))))
        .unwrap();
    let signals = d.signals.unwrap();
    assert_eq!(signals.max_similarity, 0.0);
    assert_eq!(signals.vit_verdict, Verdict::NoIssue);
    assert!((0.0..=100.0).contains(&d.confidence.value()));
}
