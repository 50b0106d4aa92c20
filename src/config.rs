use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::client::{UploadOptions, WriteMode};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Construction-time settings of a [`BoxStorage`](crate::BoxStorage).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BoxStorageConfig {
    pub prefix: Option<String>,
}

impl BoxStorageConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: BoxStorageConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// Per-call option bag. Adapters pick the keys they understand and ignore
/// the rest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StorageConfig {
    settings: Map<String, Value>,
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Upload options for this call, `default_mode` unless `mode` is set to
    /// a recognized value.
    pub fn upload_options(&self, default_mode: WriteMode) -> UploadOptions {
        UploadOptions {
            mode: self
                .get_str("mode")
                .and_then(WriteMode::parse)
                .unwrap_or(default_mode),
            autorename: self.get_bool("autorename").unwrap_or(false),
            mute: self.get_bool("mute").unwrap_or(false),
        }
    }
}
