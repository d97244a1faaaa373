//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `AQUEDUCT_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default = "default_max_batch_points")]
    pub max_batch_points: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    18080
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_max_batch_points() -> usize {
    10_000
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
            max_batch_points: default_max_batch_points(),
        }
    }
}

/// Which store implementation backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, volatile; for development and tests
    Memory,
    /// Remote store service over HTTP
    Remote,
}

/// Store backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    #[serde(default = "default_store_url")]
    pub url: String,

    #[serde(default = "default_store_timeout")]
    pub request_timeout_ms: u64,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_store_url() -> String {
    "http://localhost:6380".to_string()
}

fn default_store_timeout() -> u64 {
    5000
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_store_url(),
            request_timeout_ms: default_store_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("aqueduct").join("config.toml")),
            Some(PathBuf::from("/etc/aqueduct/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("AQUEDUCT_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("AQUEDUCT_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(max) = std::env::var("AQUEDUCT_MAX_BATCH_POINTS") {
            if let Ok(m) = max.parse() {
                self.api.max_batch_points = m;
            }
        }

        if let Ok(backend) = std::env::var("AQUEDUCT_STORE_BACKEND") {
            match backend.to_lowercase().as_str() {
                "memory" => self.store.backend = StoreBackend::Memory,
                "remote" => self.store.backend = StoreBackend::Remote,
                other => eprintln!("Unknown AQUEDUCT_STORE_BACKEND '{}', keeping default", other),
            }
        }
        if let Ok(url) = std::env::var("AQUEDUCT_STORE_URL") {
            self.store.url = url;
        }
        if let Ok(timeout) = std::env::var("AQUEDUCT_STORE_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.store.request_timeout_ms = t;
            }
        }

        if let Ok(level) = std::env::var("AQUEDUCT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AQUEDUCT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// The API layer's view of this configuration.
    pub fn api_config(&self) -> crate::api::ApiConfig {
        crate::api::ApiConfig {
            host: self.api.host.clone(),
            port: self.api.port,
            max_body_size: self.api.max_body_size,
            max_batch_points: self.api.max_batch_points,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}
