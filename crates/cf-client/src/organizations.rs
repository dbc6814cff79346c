//! Organizations (`/v2/organizations`).

use crate::client::CfClient;
use crate::error::CfResult;
use crate::jobs::{delete_v2_async, V2Job};
use crate::pagination::{collect_all, V2Page, V2Resource};
use serde::{Deserialize, Serialize};

const ORGANIZATIONS: &str = "/v2/organizations";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationEntity {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub quota_definition_guid: Option<String>,
}

pub type Organization = V2Resource<OrganizationEntity>;

pub struct OrganizationsClient;

impl OrganizationsClient {
    pub async fn list(client: &CfClient) -> CfResult<Vec<Organization>> {
        collect_all::<V2Page<_>, _>(client, ORGANIZATIONS, &[]).await
    }

    pub async fn find_by_name(client: &CfClient, name: &str) -> CfResult<Option<Organization>> {
        let q = format!("name:{}", name);
        let orgs: Vec<Organization> =
            collect_all::<V2Page<_>, _>(client, ORGANIZATIONS, &[("q", q.as_str())]).await?;
        Ok(orgs.into_iter().find(|o| o.entity.name == name))
    }

    /// Start deleting the organization and, when `recursive`, everything in it.
    pub async fn delete(client: &CfClient, guid: &str, recursive: bool) -> CfResult<V2Job> {
        delete_v2_async(client, &format!("{}/{}", ORGANIZATIONS, guid), recursive).await
    }
}
