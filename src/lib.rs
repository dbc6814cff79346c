//! # cf-operations – Cloud Foundry operations that wait for completion
//!
//! Each operation submits a request to the Cloud Controller, then waits for
//! the asynchronous work it started (a job, a service broker operation, a
//! build, package processing) using [`cf_waiter`], and reports the result.
//!
//! | Operation                   | Submits                                   | Waits on                  | Policy    |
//! |-----------------------------|-------------------------------------------|---------------------------|-----------|
//! | `delete_application`        | `DELETE /v3/apps/{guid}`                  | v3 job                    | `job`     |
//! | `delete_organization`       | `DELETE /v2/organizations/{guid}?async`   | v2 job                    | `job`     |
//! | `delete_space`              | `DELETE /v2/spaces/{guid}?async`          | v2 job                    | `job`     |
//! | `delete_route`              | `DELETE /v2/routes/{guid}?async`          | v2 job                    | `job`     |
//! | `create_service_instance`   | `POST /v2/service_instances`              | instance `last_operation` | `service` |
//! | `delete_service_instance`   | `DELETE /v2/service_instances/{guid}`     | v2 job or instance        | `service` |
//! | `stage_package`             | `POST /v3/builds`                         | build                     | `staging` |
//! | `upload_package_and_wait`   | `POST /v3/packages/{guid}/upload`         | package                   | `upload`  |
//!
//! A poll that fails at the transport level ends the wait immediately with
//! [`OperationsError::Client`]; the client's own retry policy is the only
//! retry.

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod config;
pub mod error;

mod applications;
mod organizations;
mod services;
mod wait;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use config::OperationsConfig;
pub use error::{OperationsError, OperationsResult};

pub use cf_client;
pub use cf_waiter;

use cf_client::CfClient;
use config::Policies;
use tokio_util::sync::CancellationToken;

/// High-level Cloud Foundry operations over one [`CfClient`].
#[derive(Debug, Clone)]
pub struct CloudFoundryOperations {
    client: CfClient,
    config: OperationsConfig,
    policies: Policies,
    space_guid: Option<String>,
    cancellation: Option<CancellationToken>,
}

impl CloudFoundryOperations {
    /// Fails if any policy in `config` is invalid.
    pub fn new(client: CfClient, config: OperationsConfig) -> OperationsResult<Self> {
        let policies = Policies::try_from(&config)?;
        Ok(Self {
            client,
            config,
            policies,
            space_guid: None,
            cancellation: None,
        })
    }

    /// Restrict application lookups by name to one space.
    pub fn with_space(mut self, space_guid: impl Into<String>) -> Self {
        self.space_guid = Some(space_guid.into());
        self
    }

    /// Every wait started after this observes `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn client(&self) -> &CfClient {
        &self.client
    }

    pub fn config(&self) -> &OperationsConfig {
        &self.config
    }
}
