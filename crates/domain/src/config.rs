//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_LOG_FILTER,
    DEFAULT_REFRESH_HEADER, DEFAULT_REFRESH_PATH, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STORE_READ_TIMEOUT_MS,
};
use crate::errors::{MopleError, Result};

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// REST API and token refresh configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-call timeout, applied to API calls and the refresh call alike.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub refresh_path: String,
    pub refresh_header: String,
    pub user_agent: Option<String>,
}

/// Credential storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Preferences file; `None` keeps credentials in memory only.
    pub path: Option<String>,
    /// Upper bound for a blocking credential read from the network thread.
    pub read_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, overridden by `RUST_LOG` when set.
    pub filter: String,
    pub json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_header: DEFAULT_REFRESH_HEADER.to_string(),
            user_agent: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: None, read_timeout_ms: DEFAULT_STORE_READ_TIMEOUT_MS }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `MopleError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        if self.storage.read_timeout_ms == 0 {
            return Err(MopleError::Config("storage.read_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

impl ApiConfig {
    /// # Errors
    /// Returns `MopleError::Config` for a non-http(s) base URL, zero
    /// timeouts, or an unusable refresh path/header.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            MopleError::Config(format!("api.base_url '{}' is invalid: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MopleError::Config(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(MopleError::Config("api timeouts must be positive".into()));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(MopleError::Config(format!(
                "api.refresh_path must start with '/', got '{}'",
                self.refresh_path
            )));
        }
        if self.refresh_header.trim().is_empty() {
            return Err(MopleError::Config("api.refresh_header must not be empty".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL joined with `path`, without doubling the separating slash.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    #[must_use]
    pub fn refresh_url(&self) -> String {
        self.endpoint(&self.refresh_path)
    }
}

impl StorageConfig {
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.refresh_url(), "https://api.mople.app/auth/recreate");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[api]
base_url = "http://localhost:8080/"
refresh_header = "X-Refresh"
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8080/");
        assert_eq!(config.api.refresh_header, "X-Refresh");
        assert_eq!(config.api.refresh_path, DEFAULT_REFRESH_PATH);
        assert_eq!(config.api.endpoint("/plans"), "http://localhost:8080/plans");
        assert!(config.storage.path.is_none());
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = Config {
            api: ApiConfig { base_url: "ftp://example.com".into(), ..ApiConfig::default() },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(MopleError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.read_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_relative_refresh_path() {
        let mut config = Config::default();
        config.api.refresh_path = "auth/recreate".into();
        assert!(config.validate().is_err());
    }
}
