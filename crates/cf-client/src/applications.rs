//! Applications (`/v3/apps`).

use crate::client::CfClient;
use crate::error::CfResult;
use crate::jobs::accepted_v3_job;
use crate::pagination::{collect_all, V3Page};
use cf_waiter::OperationReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const APPS: &str = "/v3/apps";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub guid: String,
    pub name: String,
    /// `STARTED` or `STOPPED`.
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct ApplicationsClient;

impl ApplicationsClient {
    pub async fn list(client: &CfClient, space_guid: Option<&str>) -> CfResult<Vec<Application>> {
        let query: Vec<(&str, &str)> = space_guid.map(|g| ("space_guids", g)).into_iter().collect();
        collect_all::<V3Page<_>, _>(client, APPS, &query).await
    }

    /// The application called `name`, if one is visible.
    pub async fn find_by_name(
        client: &CfClient,
        name: &str,
        space_guid: Option<&str>,
    ) -> CfResult<Option<Application>> {
        let mut query = vec![("names", name)];
        if let Some(g) = space_guid {
            query.push(("space_guids", g));
        }
        let apps: Vec<Application> = collect_all::<V3Page<_>, _>(client, APPS, &query).await?;
        Ok(apps.into_iter().find(|a| a.name == name))
    }

    pub async fn get(client: &CfClient, guid: &str) -> CfResult<Application> {
        client.get(&format!("{}/{}", APPS, guid), &[]).await
    }

    pub async fn start(client: &CfClient, guid: &str) -> CfResult<Application> {
        let path = format!("{}/{}/actions/start", APPS, guid);
        client.post_empty(&path, &[]).await?.json(&path)
    }

    pub async fn stop(client: &CfClient, guid: &str) -> CfResult<Application> {
        let path = format!("{}/{}/actions/stop", APPS, guid);
        client.post_empty(&path, &[]).await?.json(&path)
    }

    /// Start the delete; the returned job tracks it.
    pub async fn delete(client: &CfClient, guid: &str) -> CfResult<OperationReference> {
        let path = format!("{}/{}", APPS, guid);
        let resp = client.delete(&path, &[]).await?;
        accepted_v3_job(&path, &resp)
    }
}
