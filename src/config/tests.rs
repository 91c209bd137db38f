use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_copyguard_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("COPYGUARD_PORT");
        env::remove_var("COPYGUARD_BIND_ADDR");
        env::remove_var("COPYGUARD_AI_MODE");
        env::remove_var("COPYGUARD_REFERENCE_DIR");
        env::remove_var("COPYGUARD_UPLOAD_DIR");
        env::remove_var("COPYGUARD_VIT_MODEL_PATH");
        env::remove_var("COPYGUARD_CLIP_MODEL_PATH");
        env::remove_var("COPYGUARD_SIMILARITY_THRESHOLD");
        env::remove_var("COPYGUARD_REFERENCE_CACHE");
        env::remove_var("COPYGUARD_SKIP_UNREADABLE");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 5001);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.mode, EngineMode::Mock);
    assert_eq!(config.reference_dir, PathBuf::from("./reference_images"));
    assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
    assert!(config.vit_model_path.is_none());
    assert!(config.clip_model_path.is_none());
    assert_eq!(config.similarity_threshold, 0.9);
    assert!(!config.reference_cache);
    assert!(!config.skip_unreadable);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:5001");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_engine_mode_parse() {
    assert_eq!("real".parse::<EngineMode>().unwrap(), EngineMode::Real);
    assert_eq!("MOCK".parse::<EngineMode>().unwrap(), EngineMode::Mock);
    assert_eq!(" Real ".parse::<EngineMode>().unwrap(), EngineMode::Real);

    let err = "gpu".parse::<EngineMode>().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMode { .. }));
    assert!(err.to_string().contains("gpu"));
}

#[test]
fn test_engine_mode_display() {
    assert_eq!(EngineMode::Real.to_string(), "real");
    assert_eq!(EngineMode::Mock.to_string(), "mock");
    assert_eq!(EngineMode::default(), EngineMode::Mock);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_copyguard_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 5001);
    assert_eq!(config.mode, EngineMode::Mock);
    assert_eq!(config.similarity_threshold, 0.9);
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_real_mode() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_AI_MODE", "real")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.mode, EngineMode::Real);
    });
}

#[test]
#[serial]
fn test_from_env_empty_mode_uses_default() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_AI_MODE", "  ")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.mode, EngineMode::Mock);
    });
}

#[test]
#[serial]
fn test_from_env_invalid_mode() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_AI_MODE", "hybrid")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMode { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_custom_paths() {
    clear_copyguard_env();

    with_env_vars(
        &[
            ("COPYGUARD_REFERENCE_DIR", "/srv/refs"),
            ("COPYGUARD_UPLOAD_DIR", "/srv/uploads"),
            ("COPYGUARD_VIT_MODEL_PATH", "/models/vit-base-patch16-224"),
            ("COPYGUARD_CLIP_MODEL_PATH", "/models/clip-vit-base-patch32"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.reference_dir, PathBuf::from("/srv/refs"));
            assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
            assert_eq!(
                config.vit_model_path,
                Some(PathBuf::from("/models/vit-base-patch16-224"))
            );
            assert_eq!(
                config.clip_model_path,
                Some(PathBuf::from("/models/clip-vit-base-patch32"))
            );
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_model_path_is_none() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_VIT_MODEL_PATH", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.vit_model_path.is_none());
    });
}

#[test]
#[serial]
fn test_from_env_threshold() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_SIMILARITY_THRESHOLD", "0.85")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.similarity_threshold, 0.85);
    });
}

#[test]
#[serial]
fn test_from_env_threshold_out_of_range() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_SIMILARITY_THRESHOLD", "1.5")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_threshold_not_number() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_SIMILARITY_THRESHOLD", "high")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_bool_flags() {
    clear_copyguard_env();

    with_env_vars(
        &[
            ("COPYGUARD_REFERENCE_CACHE", "true"),
            ("COPYGUARD_SKIP_UNREADABLE", "1"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.reference_cache);
            assert!(config.skip_unreadable);
        },
    );
}

#[test]
#[serial]
fn test_from_env_invalid_bool_uses_default() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_REFERENCE_CACHE", "maybe")], || {
        let config = Config::from_env().expect("should parse with fallback");
        assert!(!config.reference_cache);
    });
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_all_interfaces_bind() {
    clear_copyguard_env();

    assert!(Config::from_env().unwrap().bind_addr.is_loopback());

    with_env_vars(&[("COPYGUARD_BIND_ADDR", "0.0.0.0")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.bind_addr.is_unspecified());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5001");
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_copyguard_env();

    with_env_vars(&[("COPYGUARD_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
fn test_validate_success_with_defaults() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_upload_dir_is_file() {
    let config = Config {
        upload_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_reference_dir_is_file() {
    let config = Config {
        reference_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_threshold_out_of_range() {
    let config = Config {
        similarity_threshold: -1.5,
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidThreshold { .. }));
}

#[test]
fn test_validate_real_mode_requires_models() {
    let config = Config {
        mode: EngineMode::Real,
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingEnvVar {
            name: "COPYGUARD_VIT_MODEL_PATH"
        }
    ));
}

#[test]
fn test_validate_real_mode_nonexistent_model_dir() {
    let config = Config {
        mode: EngineMode::Real,
        vit_model_path: Some(PathBuf::from("/nonexistent/vit")),
        clip_model_path: Some(PathBuf::from("/nonexistent/clip")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_real_mode_model_path_is_file() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = Config {
        mode: EngineMode::Real,
        vit_model_path: Some(manifest_dir.join("Cargo.toml")),
        clip_model_path: Some(manifest_dir.join("src")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_real_mode_with_existing_dirs() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = Config {
        mode: EngineMode::Real,
        vit_model_path: Some(manifest_dir.join("src")),
        clip_model_path: Some(manifest_dir.join("src")),
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        value: "0".to_string(),
    };
    assert!(err.to_string().contains("1 and 65535"));

    let err = ConfigError::PathNotFound {
        path: PathBuf::from("/some/path"),
    };
    assert!(err.to_string().contains("/some/path"));

    let err = ConfigError::MissingEnvVar {
        name: "COPYGUARD_CLIP_MODEL_PATH",
    };
    assert!(err.to_string().contains("COPYGUARD_CLIP_MODEL_PATH"));
}
