//! Paged list responses.
//!
//! v2 pages link forward with a relative `next_url`; v3 pages carry an
//! absolute `pagination.next.href`. [`paginate`] follows either kind lazily,
//! one request per page.

use crate::client::CfClient;
use crate::error::CfResult;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ── v2 ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Metadata {
    pub guid: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A v2 `{metadata, entity}` resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Resource<E> {
    pub metadata: V2Metadata,
    pub entity: E,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Page<T> {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default = "Vec::new")]
    pub resources: Vec<T>,
}

// ── v3 ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V3Pagination {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub next: Option<Link>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V3Page<T> {
    pub pagination: V3Pagination,
    #[serde(default = "Vec::new")]
    pub resources: Vec<T>,
}

/// One decoded page: its items and where the next one lives.
pub trait Page<T> {
    fn into_parts(self) -> (Vec<T>, Option<String>);
}

impl<T> Page<T> for V2Page<T> {
    fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.resources, self.next_url.filter(|u| !u.is_empty()))
    }
}

impl<T> Page<T> for V3Page<T> {
    fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.resources, self.pagination.next.map(|l| l.href))
    }
}

struct Cursor<T> {
    buffer: VecDeque<T>,
    next: Option<String>,
    query: Option<Vec<(String, String)>>,
}

/// Every resource of a listing, fetching pages as the stream is polled.
///
/// `query` applies to the first request only; follow-up links already carry
/// it. A failed request is yielded once and ends the stream.
pub fn paginate<'a, P, T>(
    client: &'a CfClient,
    path: &str,
    query: &[(&str, &str)],
) -> BoxStream<'a, CfResult<T>>
where
    P: Page<T> + DeserializeOwned + Send + 'a,
    T: Send + 'a,
{
    let cursor = Cursor {
        buffer: VecDeque::new(),
        next: Some(path.to_string()),
        query: Some(
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
    };

    stream::unfold(cursor, move |mut cursor| async move {
        loop {
            if let Some(item) = cursor.buffer.pop_front() {
                return Some((Ok(item), cursor));
            }
            let url = cursor.next.take()?;
            let query = cursor.query.take().unwrap_or_default();
            let pairs: Vec<(&str, &str)> = query
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            log::debug!("Fetching page {}", url);
            match client.get::<P>(&url, &pairs).await {
                Ok(page) => {
                    let (items, next) = page.into_parts();
                    cursor.buffer.extend(items);
                    cursor.next = next;
                }
                Err(e) => return Some((Err(e), cursor)),
            }
        }
    })
    .boxed()
}

/// Drain [`paginate`] into a `Vec`.
pub async fn collect_all<'a, P, T>(
    client: &'a CfClient,
    path: &str,
    query: &[(&str, &str)],
) -> CfResult<Vec<T>>
where
    P: Page<T> + DeserializeOwned + Send + 'a,
    T: Send + 'a,
{
    paginate::<P, T>(client, path, query).try_collect().await
}
