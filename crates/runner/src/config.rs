//! Runner configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SmokeError, SmokeResult};

/// Default address of the service under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Pause after every step
    pub step_delay: Duration,

    /// Per-request timeout (None = transport default, i.e. wait forever)
    pub request_timeout: Option<Duration>,

    /// Directory receiving the per-run log file
    pub log_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            step_delay: Duration::from_secs(1),
            request_timeout: None,
            log_dir: PathBuf::from("."),
        }
    }
}

impl RunnerConfig {
    /// Config pointed at `base_url`, otherwise default
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Check the config and normalize the base URL
    pub fn validate(mut self) -> SmokeResult<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(SmokeError::InvalidConfig("base URL is empty".to_string()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(SmokeError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {}",
                trimmed
            )));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(SmokeError::InvalidConfig(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.step_delay, Duration::from_secs(1));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_validate_trims_trailing_slash() {
        let config = RunnerConfig::for_base_url("http://127.0.0.1:8080/").validate().unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(matches!(
            RunnerConfig::for_base_url("  ").validate(),
            Err(SmokeError::InvalidConfig(_))
        ));
        assert!(matches!(
            RunnerConfig::for_base_url("localhost:3000").validate(),
            Err(SmokeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = RunnerConfig {
            request_timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
