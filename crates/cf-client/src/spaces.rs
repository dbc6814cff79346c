//! Spaces (`/v2/spaces`).

use crate::client::CfClient;
use crate::error::CfResult;
use crate::jobs::{delete_v2_async, V2Job};
use crate::pagination::{collect_all, V2Page, V2Resource};
use serde::{Deserialize, Serialize};

const SPACES: &str = "/v2/spaces";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceEntity {
    pub name: String,
    #[serde(default)]
    pub organization_guid: Option<String>,
    #[serde(default)]
    pub allow_ssh: Option<bool>,
}

pub type Space = V2Resource<SpaceEntity>;

pub struct SpacesClient;

impl SpacesClient {
    pub async fn list(client: &CfClient, organization_guid: Option<&str>) -> CfResult<Vec<Space>> {
        let filter = organization_guid.map(|g| format!("organization_guid:{}", g));
        let query: Vec<(&str, &str)> = filter.iter().map(|q| ("q", q.as_str())).collect();
        collect_all::<V2Page<_>, _>(client, SPACES, &query).await
    }

    pub async fn find_by_name(
        client: &CfClient,
        organization_guid: &str,
        name: &str,
    ) -> CfResult<Option<Space>> {
        Ok(Self::list(client, Some(organization_guid))
            .await?
            .into_iter()
            .find(|s| s.entity.name == name))
    }

    pub async fn delete(client: &CfClient, guid: &str, recursive: bool) -> CfResult<V2Job> {
        delete_v2_async(client, &format!("{}/{}", SPACES, guid), recursive).await
    }
}
