//! Service configuration.
//!
//! Loaded from a TOML file resolved in priority order: explicit `--config`
//! path, `./dreamwork.toml`, `~/.config/dreamwork/config.toml`, then built-in
//! defaults. Secrets (the provider API key, the Redis URL) are normally
//! supplied via environment variables rather than the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DreamError, Result};

/// Default TTL for the in-process store: 30 minutes.
pub const DEFAULT_MEMORY_TTL_SECS: u64 = 30 * 60;

/// Default TTL for the Redis store: 60 minutes.
pub const DEFAULT_REDIS_TTL_SECS: u64 = 60 * 60;

/// Which session store backend to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map. Data is lost on restart and invisible to other
    /// instances — a degraded/fallback mode.
    #[default]
    Memory,
    /// External Redis with native per-key expiry.
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub bind: String,
    /// Listen port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Redis connection URL. Overridden by `REDIS_URL` when set.
    pub redis_url: String,
    pub memory_ttl_secs: u64,
    pub redis_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            memory_ttl_secs: DEFAULT_MEMORY_TTL_SECS,
            redis_ttl_secs: DEFAULT_REDIS_TTL_SECS,
        }
    }
}

impl StoreConfig {
    /// TTL applied to every session write, fixed per backend.
    pub fn session_ttl(&self) -> Duration {
        match self.backend {
            StoreBackend::Memory => Duration::from_secs(self.memory_ttl_secs),
            StoreBackend::Redis => Duration::from_secs(self.redis_ttl_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Model passed to the generation service.
    pub model: String,
    /// API key. When empty, `OPENAI_API_KEY` from the environment is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL, overridable for proxies and tests.
    pub base_url: String,
    /// Output token cap for one generation call.
    pub max_output_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            max_output_tokens: 900,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration, resolving the file path in priority order.
    ///
    /// An explicitly passed path must exist; the fallback locations are
    /// optional and defaults apply when none is present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for candidate in Self::default_paths() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Parse a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| DreamError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&data)
            .map_err(|e| DreamError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Apply environment overrides (`REDIS_URL`). Provider key resolution
    /// happens in the provider itself so the key never sits in this struct
    /// unless the user put it in the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REDIS_URL") {
            if !url.is_empty() {
                self.store.redis_url = url;
            }
        }
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("dreamwork.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("dreamwork").join("config.toml"));
        }
        paths
    }
}
