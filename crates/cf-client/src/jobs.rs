//! Cloud Controller jobs (v2 `/v2/jobs`, v3 `/v3/jobs`).
//!
//! Asynchronous deletes answer with a job instead of doing the work inline.
//! v2 returns the job resource in the body; v3 returns 202 with a
//! `Location: .../v3/jobs/{guid}` header.

use crate::client::{CfClient, CfResponse};
use crate::error::{CfError, CfResult};
use crate::pagination::{Link, V2Resource};
use cf_waiter::{HasOperationStatus, OperationReference, OperationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const V2_JOBS: &str = "/v2/jobs";
const V3_JOBS: &str = "/v3/jobs";

// ── v2 ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2JobErrorDetails {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl V2JobErrorDetails {
    /// `CF-Code(10001): description`.
    pub fn detail(&self) -> String {
        let name = self.error_code.as_deref().unwrap_or("CF-Unknown");
        let description = self.description.as_deref().unwrap_or("no description");
        match self.code {
            Some(code) => format!("{}({}): {}", name, code, description),
            None => format!("{}: {}", name, description),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2JobEntity {
    #[serde(default)]
    pub guid: Option<String>,
    /// `queued`, `running`, `finished` or `failed`.
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_details: Option<V2JobErrorDetails>,
}

pub type V2Job = V2Resource<V2JobEntity>;

impl HasOperationStatus for V2JobEntity {
    fn operation_status(&self) -> OperationStatus {
        match self.status.as_str() {
            "queued" => OperationStatus::pending(),
            "running" => OperationStatus::running(),
            "finished" => OperationStatus::succeeded(),
            "failed" => OperationStatus::failed(
                self.error_details
                    .as_ref()
                    .map(V2JobErrorDetails::detail)
                    .or_else(|| self.error.clone())
                    .unwrap_or_else(|| "job failed without error details".to_string()),
            ),
            other => OperationStatus::running().with_progress_hint(other),
        }
    }
}

impl HasOperationStatus for V2Job {
    fn operation_status(&self) -> OperationStatus {
        self.entity.operation_status()
    }
}

// ── v3 ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V3Error {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl V3Error {
    pub fn detail(&self) -> String {
        let title = self.title.as_deref().unwrap_or("CF-Unknown");
        let detail = self.detail.as_deref().unwrap_or("no detail");
        match self.code {
            Some(code) => format!("{}({}): {}", title, code, detail),
            None => format!("{}: {}", title, detail),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobWarning {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V3Job {
    pub guid: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// E.g. `app.delete`, `service_instance.delete`.
    #[serde(default)]
    pub operation: Option<String>,
    /// `PROCESSING`, `POLLING`, `COMPLETE` or `FAILED`.
    pub state: String,
    #[serde(default)]
    pub errors: Vec<V3Error>,
    #[serde(default)]
    pub warnings: Vec<JobWarning>,
    #[serde(default)]
    pub links: HashMap<String, Link>,
}

impl HasOperationStatus for V3Job {
    fn operation_status(&self) -> OperationStatus {
        match self.state.as_str() {
            "PROCESSING" => OperationStatus::running(),
            "POLLING" => OperationStatus::running().with_progress_hint("POLLING"),
            "COMPLETE" => OperationStatus::succeeded(),
            "FAILED" => {
                let detail = if self.errors.is_empty() {
                    "job failed without errors".to_string()
                } else {
                    self.errors
                        .iter()
                        .map(V3Error::detail)
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                OperationStatus::failed(detail)
            }
            other => OperationStatus::running().with_progress_hint(other),
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────────

pub struct JobsClient;

impl JobsClient {
    pub async fn get_v2(client: &CfClient, job: &OperationReference) -> CfResult<V2Job> {
        client
            .get(&format!("{}/{}", V2_JOBS, job), &[])
            .await
    }

    pub async fn get_v3(client: &CfClient, job: &OperationReference) -> CfResult<V3Job> {
        client
            .get(&format!("{}/{}", V3_JOBS, job), &[])
            .await
    }

    /// Status of a v2 job, for use as a wait poll function.
    pub async fn poll_v2(client: &CfClient, job: OperationReference) -> CfResult<OperationStatus> {
        Ok(Self::get_v2(client, &job).await?.operation_status())
    }

    /// Status of a v3 job, for use as a wait poll function.
    pub async fn poll_v3(client: &CfClient, job: OperationReference) -> CfResult<OperationStatus> {
        Ok(Self::get_v3(client, &job).await?.operation_status())
    }
}

/// The job guid named by a `Location` header (`.../v3/jobs/{guid}`).
pub fn job_reference_from_location(location: &str) -> CfResult<OperationReference> {
    let path = url::Url::parse(location)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| location.to_string());
    let guid = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    OperationReference::new(guid).map_err(|_| {
        CfError::unexpected_response(
            location,
            &format!("Location header does not name a job: '{}'", location),
        )
    })
}

/// The v3 job started by a 202 answer.
pub(crate) fn accepted_v3_job(endpoint: &str, resp: &CfResponse) -> CfResult<OperationReference> {
    let location = resp.location.as_deref().ok_or_else(|| {
        CfError::unexpected_response(
            endpoint,
            &format!("HTTP {} without a Location header", resp.status),
        )
        .with_request_id(resp.request_id.clone())
    })?;
    job_reference_from_location(location)
}

/// The v2 job in the body of an `?async=true` answer.
pub(crate) fn accepted_v2_job(endpoint: &str, resp: &CfResponse) -> CfResult<V2Job> {
    resp.json(endpoint)
}

/// `DELETE {path}?async=true`, answered with a v2 job.
pub(crate) async fn delete_v2_async(
    client: &CfClient,
    path: &str,
    recursive: bool,
) -> CfResult<V2Job> {
    let recursive = if recursive { "true" } else { "false" };
    let resp = client
        .delete(path, &[("async", "true"), ("recursive", recursive)])
        .await?;
    accepted_v2_job(path, &resp)
}
