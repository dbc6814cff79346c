//! Managed service instances (`/v2/service_instances`).
//!
//! Brokers may provision and deprovision asynchronously. With
//! `accepts_incomplete=true` the Cloud Controller answers 202 and the
//! instance's `last_operation` tracks progress until it reads `succeeded`
//! or `failed`.

use crate::client::CfClient;
use crate::error::{CfError, CfResult};
use crate::jobs::{accepted_v2_job, V2Job};
use crate::pagination::{collect_all, V2Page, V2Resource};
use chrono::{DateTime, Utc};
use cf_waiter::{HasOperationStatus, OperationReference, OperationStatus};
use serde::{Deserialize, Serialize};

const SERVICE_INSTANCES: &str = "/v2/service_instances";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastOperation {
    /// `create`, `update` or `delete`.
    #[serde(rename = "type")]
    pub operation_type: String,
    /// `in progress`, `succeeded` or `failed`.
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasOperationStatus for LastOperation {
    fn operation_status(&self) -> OperationStatus {
        match self.state.as_str() {
            "in progress" => {
                let status = OperationStatus::running();
                match self.description {
                    Some(ref d) if !d.is_empty() => status.with_progress_hint(d.clone()),
                    _ => status,
                }
            }
            "succeeded" => OperationStatus::succeeded(),
            "failed" => OperationStatus::failed(
                self.description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| format!("service instance {} failed", self.operation_type)),
            ),
            other => OperationStatus::running().with_progress_hint(other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstanceEntity {
    pub name: String,
    #[serde(default)]
    pub service_plan_guid: Option<String>,
    #[serde(default)]
    pub space_guid: Option<String>,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(rename = "type", default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub last_operation: Option<LastOperation>,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub type ServiceInstance = V2Resource<ServiceInstanceEntity>;

/// No `last_operation` means nothing is in flight.
impl HasOperationStatus for ServiceInstance {
    fn operation_status(&self) -> OperationStatus {
        self.entity
            .last_operation
            .as_ref()
            .map(LastOperation::operation_status)
            .unwrap_or_else(OperationStatus::succeeded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceInstanceRequest {
    pub name: String,
    pub service_plan_guid: String,
    pub space_guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

/// What a delete request started.
#[derive(Debug, Clone)]
pub enum ServiceInstanceDeletion {
    /// Deleted synchronously.
    Completed,
    /// A v2 job tracks the delete.
    Job(V2Job),
    /// The broker deprovisions asynchronously; poll the instance until it 404s.
    InProgress(ServiceInstance),
}

pub struct ServiceInstancesClient;

impl ServiceInstancesClient {
    pub async fn list(client: &CfClient, space_guid: Option<&str>) -> CfResult<Vec<ServiceInstance>> {
        let filter = space_guid.map(|g| format!("space_guid:{}", g));
        let query: Vec<(&str, &str)> = filter.iter().map(|q| ("q", q.as_str())).collect();
        collect_all::<V2Page<_>, _>(client, SERVICE_INSTANCES, &query).await
    }

    pub async fn get(client: &CfClient, guid: &OperationReference) -> CfResult<ServiceInstance> {
        client
            .get(&format!("{}/{}", SERVICE_INSTANCES, guid), &[])
            .await
    }

    pub async fn create(
        client: &CfClient,
        request: &CreateServiceInstanceRequest,
    ) -> CfResult<ServiceInstance> {
        client
            .post(SERVICE_INSTANCES, &[("accepts_incomplete", "true")], request)
            .await
    }

    pub async fn delete(
        client: &CfClient,
        guid: &OperationReference,
        recursive: bool,
    ) -> CfResult<ServiceInstanceDeletion> {
        let path = format!("{}/{}", SERVICE_INSTANCES, guid);
        let recursive = if recursive { "true" } else { "false" };
        let resp = client
            .delete(
                &path,
                &[
                    ("accepts_incomplete", "true"),
                    ("async", "true"),
                    ("recursive", recursive),
                ],
            )
            .await?;

        if resp.body.trim().is_empty() {
            return Ok(ServiceInstanceDeletion::Completed);
        }
        let value: serde_json::Value = resp.json(&path)?;
        if value.pointer("/entity/status").is_some() {
            return accepted_v2_job(&path, &resp).map(ServiceInstanceDeletion::Job);
        }
        if value.pointer("/entity/name").is_some() {
            return resp.json(&path).map(ServiceInstanceDeletion::InProgress);
        }
        Err(CfError::unexpected_response(
            &path,
            "delete answered with neither a job nor a service instance",
        )
        .with_request_id(resp.request_id.clone()))
    }
}
