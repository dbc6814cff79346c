//! Application lifecycle: delete, stage, upload bits.

use crate::error::{OperationsError, OperationsResult};
use crate::wait::settle;
use crate::CloudFoundryOperations;
use cf_client::{
    Application, ApplicationsClient, Build, BuildsClient, JobsClient, Package, PackagesClient,
};
use cf_waiter::OperationReference;
use log::info;

impl CloudFoundryOperations {
    /// Delete an application, looked up by name first and then by guid, and
    /// wait for the delete job.
    pub async fn delete_application(&self, name_or_guid: &str) -> OperationsResult<()> {
        let subject = format!("Application {}", name_or_guid);
        let app = self.resolve_application(name_or_guid, &subject).await?;

        let job = ApplicationsClient::delete(&self.client, &app.guid).await?;
        info!("Deleting application {} ({}), job {}", app.name, app.guid, job);

        let client = &self.client;
        let outcome = self
            .wait_for_status(&job, self.policies.job, |r| JobsClient::poll_v3(client, r))
            .await?;
        settle(outcome, &subject, "deletion")?;
        Ok(())
    }

    async fn resolve_application(
        &self,
        name_or_guid: &str,
        subject: &str,
    ) -> OperationsResult<Application> {
        let by_name =
            ApplicationsClient::find_by_name(&self.client, name_or_guid, self.space_guid.as_deref())
                .await?;
        if let Some(app) = by_name {
            return Ok(app);
        }
        match ApplicationsClient::get(&self.client, name_or_guid).await {
            Ok(app) => Ok(app),
            Err(e) if e.is_not_found() => Err(OperationsError::NotFound {
                subject: subject.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Stage a package for `app_name` and wait for the droplet. The returned
    /// build carries the droplet guid.
    pub async fn stage_package(&self, package_guid: &str, app_name: &str) -> OperationsResult<Build> {
        let subject = format!("Application {}", app_name);
        let package = OperationReference::new(package_guid)?;

        let build = BuildsClient::create(&self.client, &package).await?;
        let reference = OperationReference::new(build.guid.clone())?;
        info!("Staging package {} for {}, build {}", package, app_name, reference);

        let client = &self.client;
        let (outcome, build) = self
            .wait_for_resource(build, &reference, self.policies.staging, move |r| async move {
                BuildsClient::get(client, &r).await
            })
            .await?;
        settle(outcome, &subject, "staging")?;
        Ok(build)
    }

    /// Upload zipped bits and wait until the package is `READY`.
    pub async fn upload_package_and_wait(
        &self,
        package_guid: &str,
        bits: Vec<u8>,
    ) -> OperationsResult<Package> {
        let subject = format!("Package {}", package_guid);
        let reference = OperationReference::new(package_guid)?;

        let package = PackagesClient::upload(&self.client, &reference, bits).await?;

        let client = &self.client;
        let (outcome, package) = self
            .wait_for_resource(package, &reference, self.policies.upload, move |r| async move {
                PackagesClient::get(client, &r).await
            })
            .await?;
        settle(outcome, &subject, "upload")?;
        Ok(package)
    }
}
