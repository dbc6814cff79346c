//! Connection and retry configuration for the Cloud Controller client.

use crate::error::{CfError, CfResult};
use serde::{Deserialize, Serialize};

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Where and how to reach a Cloud Controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfConnectionConfig {
    /// API endpoint, e.g. `https://api.sys.example.com`.
    pub api_endpoint: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Overrides the default `User-Agent`.
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl CfConnectionConfig {
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> CfResult<()> {
        let url = url::Url::parse(&self.api_endpoint).map_err(|e| {
            CfError::validation(&format!(
                "Invalid API endpoint '{}': {}",
                self.api_endpoint, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CfError::validation(&format!(
                "API endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CfError::validation("Request timeout must be greater than zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(CfError::validation("Connect timeout must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(CfError::validation("Retry max_attempts must be at least 1"));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(CfError::validation(
                "Retry initial_backoff_ms must not exceed max_backoff_ms",
            ));
        }
        Ok(())
    }

    /// The endpoint without a trailing slash.
    pub fn base_url(&self) -> String {
        self.api_endpoint.trim_end_matches('/').to_string()
    }
}

/// Transient-failure retries inside a single request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Total attempts including the first (default: 3).
    pub max_attempts: u32,
    /// Backoff before the first retry in milliseconds (default: 500).
    pub initial_backoff_ms: u64,
    /// Maximum backoff in milliseconds (default: 20_000).
    pub max_backoff_ms: u64,
    /// Full jitter: sleep a random duration in `0..=backoff`.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 20_000,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}
