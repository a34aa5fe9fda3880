//! Configuration loader for Drydock.
//!
//! Reads `config.toml` from the data directory (`~/.drydock/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::Path;
use std::time::Duration;

use drydock_types::config::AppConfig;

/// Shortest HTTP timeout honoured for API calls.
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// HTTP timeout for API calls, never below one second.
pub fn request_timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.request_timeout_secs.max(MIN_REQUEST_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_types::plan::ExportFormat;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_app_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.api_base_url, "https://api.eveonline.com");
        assert_eq!(config.default_export_format, ExportFormat::Emp);
    }

    #[tokio::test]
    async fn load_app_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
api_base_url = "http://127.0.0.1:9000"
request_timeout_secs = 10
default_export_format = "text"
"#,
        )
        .await
        .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.default_export_format, ExportFormat::Text);
        assert_eq!(config.evemon_revision, "4081");
    }

    #[tokio::test]
    async fn load_app_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn request_timeout_enforces_minimum() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(request_timeout(&config), Duration::from_secs(1));
        assert_eq!(request_timeout(&AppConfig::default()), Duration::from_secs(30));
    }
}
