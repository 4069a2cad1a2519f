//! Configuration management for data-keeper
//!
//! Read once at startup and passed explicitly into constructors. Sources,
//! lowest priority first: built-in defaults, `data-keeper.toml`, then
//! `DATA_KEEPER_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::driver::{DEFAULT_CHUNK_SIZE, DriverKind};

/// Config file looked up in the working directory (extension optional)
pub const CONFIG_FILE: &str = "data-keeper";

/// Environment prefix; nested keys use `__`, e.g. `DATA_KEEPER_STORAGE__BASE_DIR`
pub const ENV_PREFIX: &str = "DATA_KEEPER";

/// Grace period a background save is waited on before being detached
pub const DEFAULT_BACKGROUND_GRACE_MS: u64 = 100;

/// Deployment environment
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Development,
    Production,
    Diagnostic,
    Testing,
}

/// Complete process configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub env: AppEnv,

    /// Enables debug-level logging unless `RUST_LOG` says otherwise.
    /// Defaults to on; production deployments turn it off.
    pub debug: bool,

    pub storage: StorageConfig,
}

/// Storage backend selection and tuning
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub driver: DriverKind,

    /// Root directory for the local driver. Must already exist.
    pub base_dir: PathBuf,

    /// Default read chunk size in bytes
    pub chunk_size: usize,

    pub background_grace_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Local,
            base_dir: PathBuf::from("./storage"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            background_grace_ms: DEFAULT_BACKGROUND_GRACE_MS,
        }
    }
}

impl StorageConfig {
    pub fn background_grace(&self) -> Duration {
        Duration::from_millis(self.background_grace_ms)
    }
}

impl AppConfig {
    /// Load configuration from `data-keeper.toml` with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration using `path` as the (optional) config file
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("env", "development")?
            .set_default("debug", true)?
            .set_default("storage.driver", "local")?
            .set_default("storage.base_dir", "./storage")?
            .set_default("storage.chunk_size", DEFAULT_CHUNK_SIZE as i64)?
            .set_default("storage.background_grace_ms", DEFAULT_BACKGROUND_GRACE_MS as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.chunk_size == 0 {
            return Err(ConfigError::Message(
                "storage.chunk_size must be greater than 0".into(),
            ));
        }

        if self.storage.driver == DriverKind::Local && self.storage.base_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "storage.base_dir cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
