//! Recursive deletes of organizations, spaces and routes via v2 jobs.

use crate::error::OperationsResult;
use crate::wait::{settle, terminal_outcome};
use crate::CloudFoundryOperations;
use cf_client::{JobsClient, OrganizationsClient, RoutesClient, SpacesClient, V2Job};
use cf_waiter::{HasOperationStatus, OperationReference};
use log::info;

impl CloudFoundryOperations {
    /// Delete an organization with all its spaces, apps and services.
    pub async fn delete_organization(&self, guid: &str) -> OperationsResult<()> {
        let job = OrganizationsClient::delete(&self.client, guid, true).await?;
        self.finish_v2_job(job, &format!("Organization {}", guid)).await
    }

    /// Delete a space with everything in it.
    pub async fn delete_space(&self, guid: &str) -> OperationsResult<()> {
        let job = SpacesClient::delete(&self.client, guid, true).await?;
        self.finish_v2_job(job, &format!("Space {}", guid)).await
    }

    /// Delete a route and its app mappings.
    pub async fn delete_route(&self, guid: &str) -> OperationsResult<()> {
        let job = RoutesClient::delete(&self.client, guid, true).await?;
        self.finish_v2_job(job, &format!("Route {}", guid)).await
    }

    async fn finish_v2_job(&self, job: V2Job, subject: &str) -> OperationsResult<()> {
        let status = job.operation_status();
        let outcome = if status.is_terminal() {
            terminal_outcome(status)
        } else {
            let reference = OperationReference::new(job.metadata.guid.clone())?;
            info!("{} deletion running as job {}", subject, reference);
            let client = &self.client;
            self.wait_for_status(&reference, self.policies.job, |r| {
                JobsClient::poll_v2(client, r)
            })
            .await?
        };
        settle(outcome, subject, "deletion")?;
        Ok(())
    }
}
