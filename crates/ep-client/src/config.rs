//! Prediction service configuration.
//!
//! One base URL serves every endpoint. Override via environment variables
//! or explicit construction for tests.

use std::time::Duration;

use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub const ENV_API_BASE: &str = "ENERPREDICT_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "ENERPREDICT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, always normalised to end with `/`.
    pub base_url: Url,
    /// Request timeout. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base(ENV_API_BASE, base_url)?,
            timeout_secs: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ENERPREDICT_API_BASE` (default: `http://localhost:8000`)
    /// - `ENERPREDICT_TIMEOUT_SECS` (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(ENV_API_BASE).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let timeout_secs = match std::env::var(ENV_TIMEOUT_SECS) {
            Ok(raw) => Some(parse_timeout(&raw)?),
            Err(_) => None,
        };
        Ok(Self {
            base_url: parse_base(ENV_API_BASE, &raw)?,
            timeout_secs,
        })
    }

    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolve an endpoint path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.base_url
            .join(path)
            .map_err(|e| ConfigError::InvalidUrl(path.to_string(), e.to_string()))
    }
}

fn parse_base(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "not a base URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout seconds: {0}")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_gets_trailing_slash() {
        let config = ApiConfig::new("http://example.test/api").unwrap();
        assert_eq!(config.base_url.as_str(), "http://example.test/api/");
        assert_eq!(
            config.endpoint("predict/models").unwrap().as_str(),
            "http://example.test/api/predict/models"
        );
    }

    #[test]
    fn default_base_resolves_root_endpoints() {
        let config = ApiConfig::new(DEFAULT_API_BASE).unwrap();
        assert_eq!(
            config.endpoint("predict/").unwrap().as_str(),
            "http://localhost:8000/predict/"
        );
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(parse_timeout("ten").is_err());
        assert_eq!(parse_timeout(" 15 ").unwrap(), 15);
    }
}
