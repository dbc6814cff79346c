//! Wait policies for each kind of operation.

use cf_waiter::{PolicyError, WaitPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff bounds shared by every wait, plus one deadline per operation
/// kind. All values are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationsConfig {
    /// Sleep before the second poll (default 1 s).
    pub initial_interval_ms: u64,
    /// Upper bound on any sleep between polls (default 15 s).
    pub max_interval_ms: u64,
    /// Application, organization, space and route delete jobs (default 5 min).
    pub job_timeout_ms: u64,
    /// Service instance provisioning and deprovisioning (default 5 min).
    pub service_timeout_ms: u64,
    /// Staging a package into a droplet (default 15 min).
    pub staging_timeout_ms: u64,
    /// Package bits processing after upload (default 5 min).
    pub upload_timeout_ms: u64,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1_000,
            max_interval_ms: 15_000,
            job_timeout_ms: 5 * 60 * 1_000,
            service_timeout_ms: 5 * 60 * 1_000,
            staging_timeout_ms: 15 * 60 * 1_000,
            upload_timeout_ms: 5 * 60 * 1_000,
        }
    }
}

impl OperationsConfig {
    pub fn job_policy(&self) -> Result<WaitPolicy, PolicyError> {
        self.policy(self.job_timeout_ms)
    }

    pub fn service_policy(&self) -> Result<WaitPolicy, PolicyError> {
        self.policy(self.service_timeout_ms)
    }

    pub fn staging_policy(&self) -> Result<WaitPolicy, PolicyError> {
        self.policy(self.staging_timeout_ms)
    }

    pub fn upload_policy(&self) -> Result<WaitPolicy, PolicyError> {
        self.policy(self.upload_timeout_ms)
    }

    fn policy(&self, timeout_ms: u64) -> Result<WaitPolicy, PolicyError> {
        WaitPolicy::new(
            Duration::from_millis(self.initial_interval_ms),
            Duration::from_millis(self.max_interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }
}

/// The four policies, validated once.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Policies {
    pub job: WaitPolicy,
    pub service: WaitPolicy,
    pub staging: WaitPolicy,
    pub upload: WaitPolicy,
}

impl TryFrom<&OperationsConfig> for Policies {
    type Error = PolicyError;

    fn try_from(config: &OperationsConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            job: config.job_policy()?,
            service: config.service_policy()?,
            staging: config.staging_policy()?,
            upload: config.upload_policy()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_call_site_constants() {
        let c = OperationsConfig::default();
        let job = c.job_policy().unwrap();
        assert_eq!(job.initial_interval(), Duration::from_secs(1));
        assert_eq!(job.max_interval(), Duration::from_secs(15));
        assert_eq!(job.overall_timeout(), Duration::from_secs(300));
        assert_eq!(c.staging_policy().unwrap().overall_timeout(), Duration::from_secs(900));
        assert!(Policies::try_from(&c).is_ok());
    }

    #[test]
    fn invalid_intervals_are_rejected() {
        let c = OperationsConfig {
            initial_interval_ms: 0,
            ..OperationsConfig::default()
        };
        assert_eq!(c.job_policy(), Err(PolicyError::ZeroInitialInterval));

        let c = OperationsConfig {
            staging_timeout_ms: 0,
            ..OperationsConfig::default()
        };
        assert!(Policies::try_from(&c).is_err());
    }

    #[test]
    fn partial_config_deserializes() {
        let c: OperationsConfig =
            serde_json::from_str(r#"{"stagingTimeoutMs": 1800000}"#).unwrap();
        assert_eq!(c.staging_timeout_ms, 1_800_000);
        assert_eq!(c.job_timeout_ms, 300_000);
    }
}
