//! Configuration system for Viz House remote charts
//! Describes where chart data comes from, how to authenticate, how often to
//! refresh, and which query columns feed which series.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use viz_house_shared::{ChartConfig, ChartsError};

pub mod parser;
pub mod refresh_interval;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser, TemplateExpander};
pub use refresh_interval::AutoRefreshInterval;
pub use validation::ConfigValidator;

/// Default format requested from the query endpoint
pub const DEFAULT_RESPONSE_FORMAT: &str = "JSONEachRow";

/// Default value of the endpoint version header
pub const DEFAULT_ENDPOINT_VERSION: &str = "2";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Shared(#[from] ChartsError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Credentials sent with every query request
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Authentication {
    Basic { username: String, password: String },
}

impl Authentication {
    pub fn basic(username: &str, password: &str) -> Self {
        Authentication::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authentication::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// HTTP request settings for the query endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestSettings {
    /// Response format requested in the POST body
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_endpoint_version", alias = "endpoint_version")]
    pub endpoint_version: String,
    #[serde(default, alias = "timeout_ms", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_format() -> String {
    DEFAULT_RESPONSE_FORMAT.to_string()
}

fn default_endpoint_version() -> String {
    DEFAULT_ENDPOINT_VERSION.to_string()
}

fn default_dimension() -> String {
    "inherit".to_string()
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            format: default_format(),
            endpoint_version: default_endpoint_version(),
            timeout_ms: None,
        }
    }
}

/// Complete configuration of one remote chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChartConfig {
    pub url: String,
    pub authentication: Authentication,
    #[serde(default, alias = "auto_refresh", skip_serializing_if = "Option::is_none")]
    pub auto_refresh: Option<AutoRefreshInterval>,
    #[serde(alias = "chart_config", alias = "chart")]
    pub chart_config: ChartConfig,
    #[serde(default)]
    pub request: RequestSettings,
    #[serde(default = "default_dimension")]
    pub height: String,
    #[serde(default = "default_dimension")]
    pub width: String,
}

impl RemoteChartConfig {
    pub fn new(url: &str, authentication: Authentication, chart_config: ChartConfig) -> Self {
        Self {
            url: url.to_string(),
            authentication,
            auto_refresh: None,
            chart_config,
            request: RequestSettings::default(),
            height: default_dimension(),
            width: default_dimension(),
        }
    }

    pub fn with_auto_refresh(mut self, interval: AutoRefreshInterval) -> Self {
        self.auto_refresh = Some(interval);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_debug_redacts_password() {
        let auth = Authentication::basic("default", "hunter2");
        let debug = format!("{auth:?}");
        assert!(debug.contains("default"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_remote_config_defaults() {
        let json = r#"{
            "url": "https://example.com/query",
            "authentication": {"type": "basic", "username": "u", "password": "p"},
            "chartConfig": {"series": []}
        }"#;

        let config: RemoteChartConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.request, RequestSettings::default());
        assert_eq!(config.request.format, "JSONEachRow");
        assert_eq!(config.auto_refresh, None);
        assert_eq!(config.height, "inherit");
        assert_eq!(config.width, "inherit");
    }
}
