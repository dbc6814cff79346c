//! Routes (`/v2/routes`).

use crate::client::CfClient;
use crate::error::CfResult;
use crate::jobs::{delete_v2_async, V2Job};
use crate::pagination::{collect_all, V2Page, V2Resource};
use serde::{Deserialize, Serialize};

const ROUTES: &str = "/v2/routes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntity {
    pub host: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub domain_guid: Option<String>,
    #[serde(default)]
    pub space_guid: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

pub type Route = V2Resource<RouteEntity>;

pub struct RoutesClient;

impl RoutesClient {
    pub async fn list(client: &CfClient, space_guid: Option<&str>) -> CfResult<Vec<Route>> {
        let path = match space_guid {
            Some(g) => format!("/v2/spaces/{}/routes", g),
            None => ROUTES.to_string(),
        };
        collect_all::<V2Page<_>, _>(client, &path, &[]).await
    }

    /// Routes whose host is `host`.
    pub async fn find_by_host(client: &CfClient, host: &str) -> CfResult<Vec<Route>> {
        let q = format!("host:{}", host);
        collect_all::<V2Page<_>, _>(client, ROUTES, &[("q", q.as_str())]).await
    }

    /// `recursive` also removes the route's app mappings.
    pub async fn delete(client: &CfClient, guid: &str, recursive: bool) -> CfResult<V2Job> {
        delete_v2_async(client, &format!("{}/{}", ROUTES, guid), recursive).await
    }
}
