//! Builds (`/v3/builds`): staging a package into a droplet.

use crate::client::CfClient;
use crate::error::CfResult;
use cf_waiter::{HasOperationStatus, OperationReference, OperationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BUILDS: &str = "/v3/builds";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub guid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    pub guid: String,
    /// `STAGING`, `STAGED` or `FAILED`.
    pub state: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub package: Option<Relationship>,
    /// Set once staging succeeds.
    #[serde(default)]
    pub droplet: Option<Relationship>,
}

impl HasOperationStatus for Build {
    fn operation_status(&self) -> OperationStatus {
        match self.state.as_str() {
            "STAGING" => OperationStatus::running(),
            "STAGED" => OperationStatus::succeeded(),
            "FAILED" => OperationStatus::failed(
                self.error
                    .clone()
                    .unwrap_or_else(|| "staging failed without error".to_string()),
            ),
            other => OperationStatus::running().with_progress_hint(other),
        }
    }
}

#[derive(Serialize)]
struct CreateBuildRequest<'a> {
    package: RelationshipRef<'a>,
}

#[derive(Serialize)]
struct RelationshipRef<'a> {
    guid: &'a str,
}

pub struct BuildsClient;

impl BuildsClient {
    /// Start staging `package_guid`.
    pub async fn create(client: &CfClient, package_guid: &OperationReference) -> CfResult<Build> {
        let body = CreateBuildRequest {
            package: RelationshipRef {
                guid: package_guid.as_str(),
            },
        };
        client.post(BUILDS, &[], &body).await
    }

    pub async fn get(client: &CfClient, build: &OperationReference) -> CfResult<Build> {
        client
            .get(&format!("{}/{}", BUILDS, build), &[])
            .await
    }
}
