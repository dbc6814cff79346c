//! Timing configuration for a wait.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Sleep before the second poll when only a timeout is given.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(1);
/// Upper bound on any single sleep when only a timeout is given.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("initial interval must be greater than zero")]
    ZeroInitialInterval,
    #[error("initial interval {initial:?} exceeds maximum interval {max:?}")]
    InitialExceedsMax { initial: Duration, max: Duration },
    #[error("overall timeout must be greater than zero")]
    ZeroTimeout,
}

/// `0 < initial_interval <= max_interval` and `overall_timeout > 0`.
///
/// Serialized with millisecond fields:
/// `{"initialIntervalMs":1000,"maxIntervalMs":15000,"overallTimeoutMs":300000}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWaitPolicy", into = "RawWaitPolicy")]
pub struct WaitPolicy {
    initial_interval: Duration,
    max_interval: Duration,
    overall_timeout: Duration,
}

impl WaitPolicy {
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        overall_timeout: Duration,
    ) -> Result<Self, PolicyError> {
        if initial_interval.is_zero() {
            return Err(PolicyError::ZeroInitialInterval);
        }
        if initial_interval > max_interval {
            return Err(PolicyError::InitialExceedsMax {
                initial: initial_interval,
                max: max_interval,
            });
        }
        if overall_timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        Ok(Self {
            initial_interval,
            max_interval,
            overall_timeout,
        })
    }

    /// One second doubling up to fifteen, bounded by `overall_timeout`.
    pub fn with_timeout(overall_timeout: Duration) -> Result<Self, PolicyError> {
        Self::new(DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_INTERVAL, overall_timeout)
    }

    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn overall_timeout(&self) -> Duration {
        self.overall_timeout
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWaitPolicy {
    initial_interval_ms: u64,
    max_interval_ms: u64,
    overall_timeout_ms: u64,
}

impl TryFrom<RawWaitPolicy> for WaitPolicy {
    type Error = PolicyError;

    fn try_from(raw: RawWaitPolicy) -> Result<Self, Self::Error> {
        WaitPolicy::new(
            Duration::from_millis(raw.initial_interval_ms),
            Duration::from_millis(raw.max_interval_ms),
            Duration::from_millis(raw.overall_timeout_ms),
        )
    }
}

impl From<WaitPolicy> for RawWaitPolicy {
    fn from(p: WaitPolicy) -> Self {
        Self {
            initial_interval_ms: p.initial_interval.as_millis() as u64,
            max_interval_ms: p.max_interval.as_millis() as u64,
            overall_timeout_ms: p.overall_timeout.as_millis() as u64,
        }
    }
}
