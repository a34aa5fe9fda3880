//! Global configuration types for Drydock.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the
//! game-data API endpoint and plan export defaults.

use serde::{Deserialize, Serialize};

use crate::plan::ExportFormat;

/// Top-level configuration.
///
/// Loaded from `~/.drydock/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the XML API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP timeout for API calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Revision stamped into exported EVEMon plans (oldest EVEMon build that reads them).
    #[serde(default = "default_evemon_revision")]
    pub evemon_revision: String,

    /// Format used by `drydock requirements --export` when none is given.
    #[serde(default)]
    pub default_export_format: ExportFormat,
}

fn default_api_base_url() -> String {
    "https://api.eveonline.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_evemon_revision() -> String {
    "4081".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            evemon_revision: default_evemon_revision(),
            default_export_format: ExportFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://api.eveonline.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.evemon_revision, "4081");
        assert_eq!(config.default_export_format, ExportFormat::Emp);
    }

    #[test]
    fn test_app_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_export_format, ExportFormat::Emp);
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
api_base_url = "http://localhost:8080"
request_timeout_secs = 5
evemon_revision = "5000"
default_export_format = "xml"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.evemon_revision, "5000");
        assert_eq!(config.default_export_format, ExportFormat::Xml);
    }
}
