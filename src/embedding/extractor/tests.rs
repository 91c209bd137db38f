use super::*;
use image::{Rgb, RgbImage};
use std::path::PathBuf;

fn solid(rgb: [u8; 3]) -> Image {
    Image::from_rgb(RgbImage::from_pixel(12, 12, Rgb(rgb)))
}

mod config_tests {
    use super::*;

    #[test]
    fn test_extractor_config_default() {
        let config = ExtractorConfig::default();
        assert_eq!(config.embedding_dim, EXTRACTOR_EMBEDDING_DIM);
        assert!(!config.testing_stub);
        assert!(config.model_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_extractor_config_new() {
        let config = ExtractorConfig::new("/models/vit-base-patch16-224");
        assert_eq!(
            config.model_dir,
            PathBuf::from("/models/vit-base-patch16-224")
        );
        assert!(!config.testing_stub);
    }

    #[test]
    fn test_extractor_config_stub_validates() {
        assert!(ExtractorConfig::stub().validate().is_ok());
    }

    #[test]
    fn test_extractor_config_zero_dim_rejected() {
        let err = ExtractorConfig::stub()
            .with_embedding_dim(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_extractor_config_empty_path_no_stub() {
        let err = ExtractorConfig::default().validate().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_extractor_config_nonexistent_dir() {
        let err = ExtractorConfig::new("/nonexistent/vit")
            .validate()
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }

    #[test]
    fn test_extractor_config_model_available_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractorConfig::new(dir.path());
        assert!(!config.model_available());

        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        assert!(!config.model_available());

        std::fs::write(dir.path().join("model.safetensors"), b"").unwrap();
        assert!(config.model_available());
    }
}

mod stub_tests {
    use super::*;

    #[test]
    fn test_stub_load() {
        let extractor = EmbeddingExtractor::stub().unwrap();
        assert!(extractor.is_stub());
        assert_eq!(extractor.embedding_dim(), EXTRACTOR_EMBEDDING_DIM);
        assert!(format!("{extractor:?}").contains("Stub"));
    }

    #[test]
    fn test_stub_embedding_has_configured_dim() {
        let extractor =
            EmbeddingExtractor::load(ExtractorConfig::stub().with_embedding_dim(32)).unwrap();
        let emb = extractor.embed(&solid([1, 2, 3])).unwrap();
        assert_eq!(emb.dim(), 32);
    }

    #[test]
    fn test_stub_is_deterministic() {
        let extractor = EmbeddingExtractor::stub().unwrap();
        let a = extractor.embed(&solid([9, 9, 9])).unwrap();
        let b = extractor.embed(&solid([9, 9, 9])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cosine(&b), 1.0);
    }

    #[test]
    fn test_stub_distinct_images_are_dissimilar() {
        let extractor = EmbeddingExtractor::stub().unwrap();
        let a = extractor.embed(&solid([0, 0, 0])).unwrap();
        let b = extractor.embed(&solid([255, 255, 255])).unwrap();
        assert!(a.cosine(&b) < 0.5);
    }

    #[test]
    fn test_stub_values_in_range() {
        let extractor = EmbeddingExtractor::stub().unwrap();
        let emb = extractor.embed(&solid([42, 42, 42])).unwrap();
        assert!(emb.as_slice().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_embed_path_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jpg");
        std::fs::write(&path, b"garbage").unwrap();

        let extractor = EmbeddingExtractor::stub().unwrap();
        let err = extractor.embed_path(&path).unwrap_err();
        assert!(matches!(err, EmbeddingError::Image(_)));
    }

    #[test]
    fn test_trait_object_dispatch() {
        let extractor: Arc<dyn ImageEmbedder> = Arc::new(EmbeddingExtractor::stub().unwrap());
        assert_eq!(extractor.embedding_dim(), EXTRACTOR_EMBEDDING_DIM);
        assert!(extractor.embed(&solid([3, 3, 3])).is_ok());
    }
}

mod model_tests {
    use super::*;

    #[test]
    fn test_load_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = EmbeddingExtractor::load(ExtractorConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }

    #[test]
    fn test_load_corrupt_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("model.safetensors"), b"not safetensors").unwrap();

        let err = EmbeddingExtractor::load(ExtractorConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelLoadFailed { .. }));
    }

    /// Requires `COPYGUARD_VIT_MODEL_PATH` pointing at google/vit-base-patch16-224.
    #[test]
    #[ignore]
    fn test_real_model_embedding() {
        let path = std::env::var("COPYGUARD_VIT_MODEL_PATH").expect("model path");
        let extractor = EmbeddingExtractor::load(ExtractorConfig::new(path)).unwrap();
        let emb = extractor.embed(&solid([120, 30, 200])).unwrap();
        assert_eq!(emb.dim(), 768);

        let again = extractor.embed(&solid([120, 30, 200])).unwrap();
        assert!((emb.cosine(&again) - 1.0).abs() < 1e-5);
    }
}
