//! Configuration data structures for the prediction cache.
//!
//! Only the namespace and the location of the persistent medium are
//! configurable here; TTL and capacity are crate constants.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::{CacheConfig, CACHE_PREFIX};
use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Cache namespace and storage settings.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the persistent cache medium.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Key prefix separating cache entries from other data in the medium.
    /// Default: `flymply_prediction_cache_`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Path of the JSON file backing the medium.
    /// Default: `~/.flymply/prediction_cache.json`
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl CacheSettings {
    /// Cache configuration for this namespace with the built-in limits.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::with_prefix(self.prefix.clone())
    }
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `warn`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            store_path: default_store_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults
fn default_prefix() -> String {
    CACHE_PREFIX.to_string()
}

fn default_store_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".flymply")
        .join("prediction_cache.json")
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}
