//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `COPYGUARD_*` environment variables.
//! The engine mode is resolved once here and never changes for the life of the process.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::DEFAULT_SIMILARITY_THRESHOLD;

/// Which decision engine serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// CLIP alignment + ViT similarity fused into one verdict.
    Real,
    /// Randomized placeholder output.
    #[default]
    Mock,
}

impl EngineMode {
    /// Lowercase name as used in config and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Real => "real",
            EngineMode::Mock => "mock",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(EngineMode::Real),
            "mock" => Ok(EngineMode::Mock),
            _ => Err(ConfigError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `COPYGUARD_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `5001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    ///
    /// Loopback only, so the bundled frontend on the same host can reach it.
    /// Set `COPYGUARD_BIND_ADDR=0.0.0.0` to listen on all interfaces.
    pub bind_addr: IpAddr,

    /// Active engine. Default: [`EngineMode::Mock`].
    pub mode: EngineMode,

    /// Reference corpus directory. Default: `./reference_images`.
    pub reference_dir: PathBuf,

    /// Where uploaded images are written. Default: `./uploads`.
    pub upload_dir: PathBuf,

    /// ViT model directory (`config.json` + `model.safetensors`).
    pub vit_model_path: Option<PathBuf>,

    /// CLIP model directory (`model.safetensors` + `tokenizer.json`).
    pub clip_model_path: Option<PathBuf>,

    /// Similarity at or above which the visual signal reports infringement. Default: `0.9`.
    pub similarity_threshold: f32,

    /// Keep reference embeddings across requests, keyed by file content. Default: `false`.
    pub reference_cache: bool,

    /// Skip undecodable reference files instead of failing the scan. Default: `false`.
    pub skip_unreadable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5001,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            mode: EngineMode::Mock,
            reference_dir: PathBuf::from("./reference_images"),
            upload_dir: PathBuf::from("./uploads"),
            vit_model_path: None,
            clip_model_path: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            reference_cache: false,
            skip_unreadable: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "COPYGUARD_PORT";
    const ENV_BIND_ADDR: &'static str = "COPYGUARD_BIND_ADDR";
    const ENV_MODE: &'static str = "COPYGUARD_AI_MODE";
    const ENV_REFERENCE_DIR: &'static str = "COPYGUARD_REFERENCE_DIR";
    const ENV_UPLOAD_DIR: &'static str = "COPYGUARD_UPLOAD_DIR";
    const ENV_VIT_MODEL_PATH: &'static str = "COPYGUARD_VIT_MODEL_PATH";
    const ENV_CLIP_MODEL_PATH: &'static str = "COPYGUARD_CLIP_MODEL_PATH";
    const ENV_SIMILARITY_THRESHOLD: &'static str = "COPYGUARD_SIMILARITY_THRESHOLD";
    const ENV_REFERENCE_CACHE: &'static str = "COPYGUARD_REFERENCE_CACHE";
    const ENV_SKIP_UNREADABLE: &'static str = "COPYGUARD_SKIP_UNREADABLE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let mode = Self::parse_mode_from_env(defaults.mode)?;
        let reference_dir =
            Self::parse_path_from_env(Self::ENV_REFERENCE_DIR, defaults.reference_dir);
        let upload_dir = Self::parse_path_from_env(Self::ENV_UPLOAD_DIR, defaults.upload_dir);
        let vit_model_path = Self::parse_optional_path_from_env(Self::ENV_VIT_MODEL_PATH);
        let clip_model_path = Self::parse_optional_path_from_env(Self::ENV_CLIP_MODEL_PATH);
        let similarity_threshold = Self::parse_threshold_from_env(defaults.similarity_threshold)?;
        let reference_cache =
            Self::parse_bool_from_env(Self::ENV_REFERENCE_CACHE, defaults.reference_cache);
        let skip_unreadable =
            Self::parse_bool_from_env(Self::ENV_SKIP_UNREADABLE, defaults.skip_unreadable);

        Ok(Self {
            port,
            bind_addr,
            mode,
            reference_dir,
            upload_dir,
            vit_model_path,
            clip_model_path,
            similarity_threshold,
            reference_cache,
            skip_unreadable,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    ///
    /// Model paths are only required in [`EngineMode::Real`]; a mock process may run
    /// without any model files on disk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.exists() && !self.upload_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.upload_dir.clone(),
            });
        }

        if self.reference_dir.exists() && !self.reference_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.reference_dir.clone(),
            });
        }

        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.similarity_threshold.to_string(),
            });
        }

        if self.mode == EngineMode::Real {
            let vit = self
                .vit_model_path
                .as_ref()
                .ok_or(ConfigError::MissingEnvVar {
                    name: Self::ENV_VIT_MODEL_PATH,
                })?;
            let clip = self
                .clip_model_path
                .as_ref()
                .ok_or(ConfigError::MissingEnvVar {
                    name: Self::ENV_CLIP_MODEL_PATH,
                })?;

            for path in [vit, clip] {
                if !path.exists() {
                    return Err(ConfigError::PathNotFound { path: path.clone() });
                }
                if !path.is_dir() {
                    return Err(ConfigError::NotADirectory { path: path.clone() });
                }
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_mode_from_env(default: EngineMode) -> Result<EngineMode, ConfigError> {
        match env::var(Self::ENV_MODE) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(default),
        }
    }

    fn parse_threshold_from_env(default: f32) -> Result<f32, ConfigError> {
        match env::var(Self::ENV_SIMILARITY_THRESHOLD) {
            Ok(value) => {
                let threshold: f32 =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidThreshold {
                            value: value.clone(),
                        })?;
                if !(-1.0..=1.0).contains(&threshold) {
                    return Err(ConfigError::InvalidThreshold { value });
                }
                Ok(threshold)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_ascii_lowercase())
            .and_then(|v| match v.as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }
}
