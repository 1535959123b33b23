//! Configuration types for bookchat.
//!
//! `AppConfig` represents `config.toml` in the data directory: where the
//! recommendation backend lives and how history writes are retried.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.bookchat/config.toml`. All fields have defaults, so an
/// empty or missing file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub recommendation: RecommendationConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Recommendation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// URL the query is POSTed to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// History persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Total write attempts per exchange (first write plus retries).
    #[serde(default = "default_persist_attempts")]
    pub persist_attempts: u32,
}

fn default_persist_attempts() -> u32 {
    2
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            persist_attempts: default_persist_attempts(),
        }
    }
}
