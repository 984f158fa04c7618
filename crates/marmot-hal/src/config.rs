//! Device configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `MARMOT_` prefix)
//! 3. Builder calls made by the embedding application
//!
//! Configuration precedence (highest to lowest):
//! 1. Builder calls
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HalError, HalResult};
use crate::poll::{PollPolicy, positive_duration};

/// Default AQT gateway hostname.
pub const DEFAULT_BASE_URL: &str = "https://gateway.aqt.eu/marmot";

/// Default number of shots per circuit execution.
pub const DEFAULT_SHOTS: u32 = 200;

/// Configuration shared by all Marmot devices.
#[derive(Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// API key; devices may fall back to a provider-specific variable.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Gateway hostname; the target path is appended per device.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of circuit evaluations per execution.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Seconds to wait between status queries.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: f64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// HTTP method used for submission and status queries.
    #[serde(default = "default_http_method")]
    pub http_method: String,

    /// Give up after this many status queries.
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,

    /// Give up after this many seconds since submission.
    #[serde(default)]
    pub poll_deadline_secs: Option<f64>,
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("shots", &self.shots)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("http_method", &self.http_method)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("poll_deadline_secs", &self.poll_deadline_secs)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

fn default_retry_delay() -> f64 {
    1.0
}

fn default_request_timeout() -> u64 {
    30
}

fn default_http_method() -> String {
    "PUT".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            shots: default_shots(),
            retry_delay_secs: default_retry_delay(),
            request_timeout_secs: default_request_timeout(),
            http_method: default_http_method(),
            max_poll_attempts: None,
            poll_deadline_secs: None,
        }
    }
}

impl DeviceConfig {
    /// Parse a YAML document.
    pub fn from_yaml(source: &str) -> HalResult<Self> {
        serde_yaml_ng::from_str(source)
            .map_err(|e| HalError::Configuration(format!("Invalid configuration: {e}")))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> HalResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            HalError::Configuration(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        debug!("Loaded device configuration from {}", path.display());
        Self::from_yaml(&source)
    }

    /// Load configuration with precedence: env > file > defaults.
    ///
    /// The result is validated before it is returned.
    pub fn load(config_file: Option<&Path>) -> HalResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from the process environment.
    pub fn merge_env(self) -> Self {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup`, which maps variable names to values.
    ///
    /// Variables:
    /// - `MARMOT_API_KEY`
    /// - `MARMOT_BASE_URL`
    /// - `MARMOT_SHOTS`
    /// - `MARMOT_RETRY_DELAY` (seconds)
    /// - `MARMOT_REQUEST_TIMEOUT` (seconds)
    /// - `MARMOT_HTTP_METHOD`
    ///
    /// Unparseable numeric values are ignored.
    pub fn merge_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("MARMOT_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("MARMOT_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("MARMOT_SHOTS").and_then(|v| v.parse().ok()) {
            self.shots = v;
        }
        if let Some(v) = lookup("MARMOT_RETRY_DELAY").and_then(|v| v.parse().ok()) {
            self.retry_delay_secs = v;
        }
        if let Some(v) = lookup("MARMOT_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = v;
        }
        if let Some(v) = lookup("MARMOT_HTTP_METHOD") {
            self.http_method = v;
        }
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the gateway hostname.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the shot count.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the retry delay in seconds.
    pub fn with_retry_delay(mut self, secs: f64) -> Self {
        self.retry_delay_secs = secs;
        self
    }

    /// Set the HTTP method name.
    pub fn with_http_method(mut self, method: impl Into<String>) -> Self {
        self.http_method = method.into();
        self
    }

    /// Limit the number of status queries.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = Some(attempts);
        self
    }

    /// Limit the total time spent polling.
    pub fn with_poll_deadline(mut self, secs: f64) -> Self {
        self.poll_deadline_secs = Some(secs);
        self
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the poll policy described by this configuration.
    pub fn poll_policy(&self) -> HalResult<PollPolicy> {
        let mut policy = PollPolicy::from_secs_f64(self.retry_delay_secs)?;
        if let Some(attempts) = self.max_poll_attempts {
            policy = policy.with_max_attempts(attempts);
        }
        if let Some(secs) = self.poll_deadline_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(HalError::Configuration(format!(
                    "Poll deadline must be positive, got {secs}"
                )));
            }
            policy = policy.with_deadline(positive_duration(secs, "poll deadline")?);
        }
        Ok(policy)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> HalResult<()> {
        if self.shots == 0 {
            return Err(HalError::Configuration(
                "Shots must be at least 1; analytic expectation values are not supported".into(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(HalError::Configuration("Base URL must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(HalError::Configuration(
                "Request timeout must be at least 1 second".into(),
            ));
        }
        self.poll_policy().map(|_| ())
    }
}
