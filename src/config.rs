//! Client configuration.
//!
//! Built with defaults, overridden from the environment and then from CLI
//! flags.
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `QA_COPILOT_URL` | backend base URL |
//! | `QA_COPILOT_TIMEOUT_SECS` | REST request timeout |
//! | `QA_COPILOT_POLL_SECS` | job polling interval |
//! | `QA_COPILOT_MAX_LINE_BYTES` | maximum buffered stream line |
//! | `QA_COPILOT_PREFS` | preferences file path |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CopilotError, CopilotResult};
use crate::sse::DEFAULT_MAX_LINE_BYTES;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "QA_COPILOT_URL";
pub const ENV_TIMEOUT_SECS: &str = "QA_COPILOT_TIMEOUT_SECS";
pub const ENV_POLL_SECS: &str = "QA_COPILOT_POLL_SECS";
pub const ENV_MAX_LINE_BYTES: &str = "QA_COPILOT_MAX_LINE_BYTES";
pub const ENV_PREFS: &str = "QA_COPILOT_PREFS";

/// Settings for [`crate::api::CopilotClient`] and the tools around it.
///
/// # Example
///
/// ```ignore
/// use qa_copilot::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://qa-copilot.internal:8000")
///     .with_stream_idle_timeout(Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Whole-request timeout for non-streaming calls (default: 30s)
    pub request_timeout: Duration,
    /// TCP/TLS connect timeout (default: 10s)
    pub connect_timeout: Duration,
    /// Maximum buffered length of one stream line (default: 1 MiB)
    pub max_line_bytes: usize,
    /// Fail a chat stream when no chunk arrives for this long (default: none)
    pub stream_idle_timeout: Option<Duration>,
    /// Interval between job status polls (default: 5s)
    pub poll_interval: Duration,
    /// Preferences file; `None` uses `~/.qa-copilot/preferences.json`
    pub preferences_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            stream_idle_timeout: None,
            poll_interval: Duration::from_secs(5),
            preferences_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL. A trailing slash is removed.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preferences_path = Some(path.into());
        self
    }

    /// Defaults overridden by the `QA_COPILOT_*` environment variables.
    pub fn from_env() -> CopilotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> CopilotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config = config.with_base_url(url.trim());
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &secs)?);
        }
        if let Some(secs) = get(ENV_POLL_SECS) {
            config.poll_interval = Duration::from_secs(parse_number(ENV_POLL_SECS, &secs)?);
        }
        if let Some(bytes) = get(ENV_MAX_LINE_BYTES) {
            config.max_line_bytes = parse_number(ENV_MAX_LINE_BYTES, &bytes)?;
        }
        if let Some(path) = get(ENV_PREFS) {
            config.preferences_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> CopilotResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CopilotError::configuration(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.max_line_bytes == 0 {
            return Err(CopilotError::configuration(
                "maximum line length must be greater than zero",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(CopilotError::configuration(
                "poll interval must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Absolute URL for an API path such as `/api/jobs`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> CopilotResult<T> {
    raw.trim().parse().map_err(|_| {
        CopilotError::configuration(format!("{} must be a non-negative integer, got '{}'", key, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_line_bytes, 1024 * 1024);
        assert!(config.stream_idle_timeout.is_none());
        assert!(config.preferences_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_base_url("https://copilot.example.com/")
            .with_request_timeout(Duration::from_secs(5))
            .with_stream_idle_timeout(Some(Duration::from_secs(60)))
            .with_poll_interval(Duration::from_secs(2))
            .with_preferences_path("/tmp/prefs.json");

        assert_eq!(config.base_url, "https://copilot.example.com");
        assert_eq!(config.url("/api/jobs"), "https://copilot.example.com/api/jobs");
        assert_eq!(config.stream_idle_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.preferences_path, Some(PathBuf::from("/tmp/prefs.json")));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "http://qa:9000/"),
            (ENV_TIMEOUT_SECS, "12"),
            (ENV_POLL_SECS, "3"),
            (ENV_MAX_LINE_BYTES, "4096"),
            (ENV_PREFS, "/var/lib/qa/prefs.json"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://qa:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.max_line_bytes, 4096);
        assert_eq!(
            config.preferences_path,
            Some(PathBuf::from("/var/lib/qa/prefs.json"))
        );
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert_eq!(err.error_code(), "E_CONFIG");
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(ClientConfig::default()
            .with_base_url("localhost:8000")
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_max_line_bytes(0)
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_poll_interval(Duration::ZERO)
            .validate()
            .is_err());
    }
}
