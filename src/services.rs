//! Managed service instances.

use crate::error::OperationsResult;
use crate::wait::{settle, terminal_outcome};
use crate::CloudFoundryOperations;
use cf_client::{
    CreateServiceInstanceRequest, JobsClient, ServiceInstance, ServiceInstanceDeletion,
    ServiceInstancesClient,
};
use cf_waiter::{HasOperationStatus, OperationReference, OperationStatus};
use log::info;

impl CloudFoundryOperations {
    /// Provision a service instance and wait for the broker to finish.
    pub async fn create_service_instance(
        &self,
        request: &CreateServiceInstanceRequest,
    ) -> OperationsResult<ServiceInstance> {
        let subject = format!("Service instance {}", request.name);

        let instance = ServiceInstancesClient::create(&self.client, request).await?;
        let reference = OperationReference::new(instance.metadata.guid.clone())?;
        info!("Creating service instance {} ({})", request.name, reference);

        let client = &self.client;
        let (outcome, instance) = self
            .wait_for_resource(instance, &reference, self.policies.service, move |r| async move {
                ServiceInstancesClient::get(client, &r).await
            })
            .await?;
        settle(outcome, &subject, "creation")?;
        Ok(instance)
    }

    /// Deprovision a service instance and its bindings and wait until it is
    /// gone.
    pub async fn delete_service_instance(&self, guid: &str) -> OperationsResult<()> {
        let subject = format!("Service instance {}", guid);
        let reference = OperationReference::new(guid)?;
        let client = &self.client;

        let outcome = match ServiceInstancesClient::delete(client, &reference, true).await? {
            ServiceInstanceDeletion::Completed => return Ok(()),
            ServiceInstanceDeletion::Job(job) => {
                let status = job.operation_status();
                if status.is_terminal() {
                    terminal_outcome(status)
                } else {
                    let job_ref = OperationReference::new(job.metadata.guid.clone())?;
                    info!("Deleting service instance {}, job {}", guid, job_ref);
                    self.wait_for_status(&job_ref, self.policies.service, |r| {
                        JobsClient::poll_v2(client, r)
                    })
                    .await?
                }
            }
            ServiceInstanceDeletion::InProgress(instance) => {
                let status = instance.operation_status();
                if status.is_terminal() {
                    terminal_outcome(status)
                } else {
                    info!("Deleting service instance {}, broker operation in progress", guid);
                    // The instance 404s once deprovisioning has finished.
                    self.wait_for_status(&reference, self.policies.service, move |r| async move {
                        match ServiceInstancesClient::get(client, &r).await {
                            Ok(instance) => Ok(instance.operation_status()),
                            Err(e) if e.is_not_found() => Ok(OperationStatus::succeeded()),
                            Err(e) => Err(e),
                        }
                    })
                    .await?
                }
            }
        };
        settle(outcome, &subject, "deletion")?;
        Ok(())
    }
}
