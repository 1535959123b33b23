//! Configuration loader for bookchat.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`AppConfig`]. A missing file yields defaults; a malformed one is an error
//! so a typo in the endpoint is not silently ignored.

use std::path::Path;

use bookchat_types::config::AppConfig;
use bookchat_types::error::ConfigError;

use crate::paths::config_path;

/// Environment variable that overrides `recommendation.endpoint`.
pub const ENDPOINT_ENV: &str = "BOOKCHAT_ENDPOINT";

/// Load configuration from `{data_dir}/config.toml`, then apply the
/// `BOOKCHAT_ENDPOINT` override.
pub async fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config = read_config_file(data_dir).await?;
    Ok(apply_endpoint_override(config, std::env::var(ENDPOINT_ENV).ok()))
}

async fn read_config_file(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => return Err(ConfigError::Io(err)),
    };

    toml::from_str::<AppConfig>(&content)
        .map_err(|err| ConfigError::Parse(format!("{}: {err}", path.display())))
}

/// Replace the configured endpoint with `endpoint` when it is non-blank.
pub fn apply_endpoint_override(mut config: AppConfig, endpoint: Option<String>) -> AppConfig {
    if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
        tracing::debug!(%endpoint, "Endpoint overridden");
        config.recommendation.endpoint = endpoint;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(tmp.path()).await.unwrap();
        assert_eq!(config.recommendation.endpoint, "http://localhost:8080");
        assert_eq!(config.recommendation.timeout_secs, 30);
        assert_eq!(config.history.persist_attempts, 2);
    }

    #[tokio::test]
    async fn test_read_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[recommendation]
endpoint = "http://books.internal:9000/recommend"
timeout_secs = 5

[history]
persist_attempts = 3
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(tmp.path()).await.unwrap();
        assert_eq!(config.recommendation.endpoint, "http://books.internal:9000/recommend");
        assert_eq!(config.recommendation.timeout_secs, 5);
        assert_eq!(config.history.persist_attempts, 3);
    }

    #[tokio::test]
    async fn test_read_config_invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = read_config_file(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_endpoint_override_replaces_configured_value() {
        let config = apply_endpoint_override(AppConfig::default(), Some("http://10.0.0.2:8080".into()));
        assert_eq!(config.recommendation.endpoint, "http://10.0.0.2:8080");
    }

    #[test]
    fn test_blank_endpoint_override_is_ignored() {
        let config = apply_endpoint_override(AppConfig::default(), Some(" ".into()));
        assert_eq!(config.recommendation.endpoint, "http://localhost:8080");

        let config = apply_endpoint_override(AppConfig::default(), None);
        assert_eq!(config.recommendation.endpoint, "http://localhost:8080");
    }
}
