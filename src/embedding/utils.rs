use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

/// Resolves the weights file inside a Hugging Face style model directory.
pub fn weights_path(model_dir: &Path) -> PathBuf {
    model_dir.join("model.safetensors")
}

/// Reads and parses `config.json` from a model directory.
pub fn read_model_config<T: DeserializeOwned>(model_dir: &Path) -> io::Result<T> {
    let config_path = model_dir.join("config.json");
    let content = std::fs::read_to_string(&config_path)?;
    serde_json::from_str(&content).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to parse {}: {}", config_path.display(), e),
        )
    })
}

/// Loads a tokenizer from a model directory or explicit tokenizer.json path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
            .join("tokenizer.json")
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}
