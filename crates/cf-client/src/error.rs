//! Cloud Controller error types.
//!
//! The v2 API answers failures with a flat body:
//! `{"code": 10000, "description": "...", "error_code": "CF-NotFound"}`.
//! The v3 API wraps one or more errors:
//! `{"errors": [{"code": 10010, "title": "CF-ResourceNotFound", "detail": "..."}]}`.
//! Both parse into [`CfError`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// No connection was established, so the request never reached the API.
pub const CONNECTION_FAILED: &str = "CF-ConnectionFailed";
pub const REQUEST_TIMEOUT: &str = "CF-RequestTimeout";
pub const REQUEST_FAILED: &str = "CF-RequestFailed";

/// Top-level error type for all Cloud Controller calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfError {
    /// HTTP status code, or 0 when no response was received.
    pub code: u16,
    /// Cloud Controller error name (e.g. "CF-ResourceNotFound").
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// The endpoint (path or URL) that failed.
    pub endpoint: String,
    /// `X-Vcap-Request-Id` of the failed request.
    pub request_id: Option<String>,
    /// Whether this error is retryable (429, 500, 502, 503, 504, connection failures).
    pub retryable: bool,
}

impl fmt::Display for CfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CF {} error [{}]: {} (HTTP {})",
            self.endpoint, self.error_code, self.message, self.code
        )?;
        if let Some(ref id) = self.request_id {
            write!(f, " [RequestId: {}]", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for CfError {}

fn retryable_status(code: u16) -> bool {
    matches!(code, 429 | 500 | 502 | 503 | 504)
}

impl CfError {
    pub fn new(endpoint: &str, code: u16, error_code: &str, message: &str) -> Self {
        Self {
            code,
            error_code: error_code.to_string(),
            message: message.to_string(),
            endpoint: endpoint.to_string(),
            request_id: None,
            retryable: retryable_status(code),
        }
    }

    /// Create from a generic string error with endpoint context.
    pub fn from_str(endpoint: &str, msg: &str) -> Self {
        Self {
            code: 500,
            error_code: "CF-Internal".to_string(),
            message: msg.to_string(),
            endpoint: endpoint.to_string(),
            request_id: None,
            retryable: false,
        }
    }

    /// Invalid configuration or argument, detected before any request.
    pub fn validation(msg: &str) -> Self {
        Self {
            code: 400,
            error_code: "CF-InvalidRequest".to_string(),
            message: msg.to_string(),
            endpoint: "config".to_string(),
            request_id: None,
            retryable: false,
        }
    }

    /// Token acquisition failed.
    pub fn auth_error(msg: &str) -> Self {
        Self {
            code: 401,
            error_code: "CF-InvalidAuthToken".to_string(),
            message: msg.to_string(),
            endpoint: "auth".to_string(),
            request_id: None,
            retryable: false,
        }
    }

    /// The server answered, but not in a shape we understand.
    pub fn unexpected_response(endpoint: &str, msg: &str) -> Self {
        Self {
            code: 502,
            error_code: "CF-UnexpectedResponse".to_string(),
            message: msg.to_string(),
            endpoint: endpoint.to_string(),
            request_id: None,
            retryable: false,
        }
    }

    /// No usable response: connection refused, reset, timed out...
    pub fn transport(endpoint: &str, err: &reqwest::Error) -> Self {
        let retryable = err.is_timeout() || err.is_connect() || err.is_request();
        Self {
            code: err.status().map(|s| s.as_u16()).unwrap_or(0),
            error_code: if err.is_timeout() {
                REQUEST_TIMEOUT.to_string()
            } else if err.is_connect() {
                CONNECTION_FAILED.to_string()
            } else {
                REQUEST_FAILED.to_string()
            },
            message: err.to_string(),
            endpoint: endpoint.to_string(),
            request_id: None,
            retryable,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }

    /// Whether the failed request provably never reached the API.
    pub fn is_connect_failure(&self) -> bool {
        self.code == 0 && self.error_code == CONNECTION_FAILED
    }

    /// Parse a Cloud Controller error from a response body.
    pub fn from_api_response(endpoint: &str, status_code: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct V3ErrorEntry {
            code: Option<i64>,
            title: Option<String>,
            detail: Option<String>,
        }
        #[derive(Deserialize)]
        struct V3Errors {
            errors: Vec<V3ErrorEntry>,
        }
        #[derive(Deserialize)]
        struct V2Error {
            code: Option<i64>,
            description: Option<String>,
            error_code: Option<String>,
        }

        if let Ok(wrapper) = serde_json::from_str::<V3Errors>(body) {
            if let Some(first) = wrapper.errors.first() {
                let mut message = first
                    .detail
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string());
                for extra in wrapper.errors.iter().skip(1) {
                    if let Some(ref d) = extra.detail {
                        message.push_str("; ");
                        message.push_str(d);
                    }
                }
                let error_code = first
                    .title
                    .clone()
                    .or_else(|| first.code.map(|c| c.to_string()))
                    .unwrap_or_else(|| "CF-Unknown".to_string());
                return Self::new(endpoint, status_code, &error_code, &message);
            }
        }

        if let Ok(err) = serde_json::from_str::<V2Error>(body) {
            if err.description.is_some() || err.error_code.is_some() {
                let error_code = err
                    .error_code
                    .or_else(|| err.code.map(|c| c.to_string()))
                    .unwrap_or_else(|| "CF-Unknown".to_string());
                let message = err
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string());
                return Self::new(endpoint, status_code, &error_code, &message);
            }
        }

        let message = if body.trim().is_empty() {
            format!("HTTP {}", status_code)
        } else {
            body.chars().take(500).collect()
        };
        Self::new(endpoint, status_code, "CF-Unknown", &message)
    }
}

/// Convenience alias.
pub type CfResult<T> = Result<T, CfError>;
