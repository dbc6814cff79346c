//! Packages (`/v3/packages`): application bits awaiting staging.

use crate::client::CfClient;
use crate::error::CfResult;
use cf_waiter::{HasOperationStatus, OperationReference, OperationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PACKAGES: &str = "/v3/packages";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub guid: String,
    /// `bits` or `docker`.
    #[serde(rename = "type")]
    pub package_type: String,
    /// `AWAITING_UPLOAD`, `PROCESSING_UPLOAD`, `COPYING`, `READY`, `FAILED` or `EXPIRED`.
    pub state: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HasOperationStatus for Package {
    fn operation_status(&self) -> OperationStatus {
        match self.state.as_str() {
            "AWAITING_UPLOAD" => OperationStatus::pending(),
            "PROCESSING_UPLOAD" | "COPYING" => {
                OperationStatus::running().with_progress_hint(self.state.clone())
            }
            "READY" => OperationStatus::succeeded(),
            "FAILED" => OperationStatus::failed(
                self.data
                    .as_ref()
                    .and_then(|d| d.get("error"))
                    .and_then(|e| e.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("package {} failed", self.guid)),
            ),
            "EXPIRED" => OperationStatus::failed(format!("package {} expired", self.guid)),
            other => OperationStatus::running().with_progress_hint(other),
        }
    }
}

pub struct PackagesClient;

impl PackagesClient {
    pub async fn get(client: &CfClient, package: &OperationReference) -> CfResult<Package> {
        client
            .get(&format!("{}/{}", PACKAGES, package), &[])
            .await
    }

    /// Upload zipped application bits. Processing continues after the call returns.
    pub async fn upload(
        client: &CfClient,
        package: &OperationReference,
        bits: Vec<u8>,
    ) -> CfResult<Package> {
        log::debug!("Uploading {} bytes to package {}", bits.len(), package);
        client
            .upload(
                &format!("{}/{}/upload", PACKAGES, package),
                "bits",
                "application.zip",
                bits,
            )
            .await
    }
}
