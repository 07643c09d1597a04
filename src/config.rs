// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration read from environment variables at startup.
//!
//! All values are resolved exactly once in [`ServiceConfig::from_env`] and
//! never reloaded for the life of the process.

use std::env;
use std::path::PathBuf;

/// Model loaded when `MODEL_ID` is unset
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-small-en-v1.5";

/// Port bound when `API_PORT` is unset
pub const DEFAULT_API_PORT: u16 = 8080;

/// Runtime configuration for the embeddings server
///
/// # Environment Variables
/// - `MODEL_ID`: HuggingFace model identifier both backends attempt to load
/// - `API_PORT`: HTTP listen port
/// - `MODEL_CACHE_DIR`: Directory for downloaded model artifacts
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Pretrained model identifier (e.g., "BAAI/bge-small-en-v1.5")
    pub model_id: String,

    /// HTTP listen port
    pub api_port: u16,

    /// Cache directory for model downloads
    pub cache_dir: PathBuf,
}

impl ServiceConfig {
    /// Reads configuration from the process environment, applying defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let model_id = env::var("MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_API_PORT);

        let cache_dir = env::var("MODEL_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./models"));

        Self {
            model_id,
            api_port,
            cache_dir,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_port: DEFAULT_API_PORT,
            cache_dir: PathBuf::from("./models"),
        }
    }
}
