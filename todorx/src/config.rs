//! Client configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, and `TODORX_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_BASE_URL: &str = "TODORX_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "TODORX_TIMEOUT_MS";
pub const ENV_TOKEN_PATH: &str = "TODORX_TOKEN_PATH";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, without trailing slash.
    pub base_url: String,
    /// Per-request deadline in milliseconds. Zero disables it.
    pub timeout_ms: u64,
    /// Where the session token is persisted.
    pub token_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            token_path: default_token_path(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.normalized()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `TODORX_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`, keyed by the
    /// `TODORX_*` variable names.
    pub fn with_overrides<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self;
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_MS,
                    value: timeout.clone(),
                })?;
        }
        if let Some(path) = lookup(ENV_TOKEN_PATH) {
            config.token_path = PathBuf::from(path);
        }
        config.normalized()
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    fn normalized(self) -> Result<Self, ConfigError> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url",
                value: self.base_url,
            });
        }
        Ok(Self { base_url, ..self })
    }
}

/// `<data dir>/todorx/session.json`, falling back to the working directory.
pub fn default_token_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("todorx");
    path.push("session.json");
    path
}
