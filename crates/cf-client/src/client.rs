//! Base Cloud Controller HTTP client.
//!
//! Adds bearer auth, `User-Agent` and a fresh `X-Vcap-Request-Id` to every
//! request, and retries transient failures (429, 5xx gateway errors,
//! connection failures) with exponential backoff. POST and PATCH are only
//! retried when the request cannot have been processed. Typed service clients in
//! the sibling modules are thin wrappers over the verbs here.

use crate::auth::TokenProvider;
use crate::config::{CfConnectionConfig, RetryConfig};
use crate::error::{CfError, CfResult};
use log::{debug, warn};
use reqwest::{multipart, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_ID_HEADER: &str = "X-Vcap-Request-Id";

/// Cloud Controller client shared by every service module.
#[derive(Clone)]
pub struct CfClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    retry_config: RetryConfig,
    user_agent: String,
}

/// Response from a Cloud Controller call.
#[derive(Debug, Clone)]
pub struct CfResponse {
    pub status: u16,
    /// `Location` header, set on 201/202 answers that point at a job.
    pub location: Option<String>,
    pub body: String,
    pub request_id: Option<String>,
}

impl CfResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body, naming `endpoint` on failure.
    pub fn json<T: DeserializeOwned>(&self, endpoint: &str) -> CfResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            CfError::unexpected_response(
                endpoint,
                &format!("Failed to parse response: {}; body: {}", e, truncate(&self.body)),
            )
            .with_request_id(self.request_id.clone())
        })
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Request body, rebuilt for every attempt.
#[derive(Debug, Clone)]
enum Payload {
    Empty,
    Json(String),
    Bits {
        field: &'static str,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// POST and PATCH may already have been acted on when a gateway answers
/// 5xx, so they are repeated only when the API shed the request (429, 503)
/// or it never left this host.
fn should_retry(method: &Method, error: &CfError) -> bool {
    if !error.retryable {
        return false;
    }
    match *method {
        Method::POST | Method::PATCH => {
            matches!(error.code, 429 | 503) || error.is_connect_failure()
        }
        _ => true,
    }
}

impl CfClient {
    pub fn new(config: &CfConnectionConfig, tokens: Arc<dyn TokenProvider>) -> CfResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| CfError::from_str("client", &format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            tokens,
            retry_config: config.retry.clone(),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("cf-operations/{}", env!("CARGO_PKG_VERSION"))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs (pagination links, `Location` headers) pass through.
    pub fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else if path_or_url.starts_with('/') {
            format!("{}{}", self.base_url, path_or_url)
        } else {
            format!("{}/{}", self.base_url, path_or_url)
        }
    }

    // ── Verbs ───────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> CfResult<T> {
        self.execute(Method::GET, path, query, Payload::Empty)
            .await?
            .json(path)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> CfResult<T> {
        let payload = Self::json_payload(path, body)?;
        self.execute(Method::POST, path, query, payload)
            .await?
            .json(path)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> CfResult<T> {
        let payload = Self::json_payload(path, body)?;
        self.execute(Method::PUT, path, query, payload)
            .await?
            .json(path)
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> CfResult<T> {
        let payload = Self::json_payload(path, body)?;
        self.execute(Method::PATCH, path, &[], payload)
            .await?
            .json(path)
    }

    /// DELETE, returning the raw response: depending on the endpoint the
    /// answer is 204 with no body, 202 with a job body, or 202 with a
    /// `Location` header.
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> CfResult<CfResponse> {
        self.execute(Method::DELETE, path, query, Payload::Empty)
            .await
    }

    /// POST with no body, returning the raw response (actions, async starts).
    pub async fn post_empty(&self, path: &str, query: &[(&str, &str)]) -> CfResult<CfResponse> {
        self.execute(Method::POST, path, query, Payload::Empty)
            .await
    }

    /// Multipart upload of `bytes` under form field `field`.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &'static str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> CfResult<T> {
        let payload = Payload::Bits {
            field,
            file_name: file_name.to_string(),
            bytes,
        };
        self.execute(Method::POST, path, &[], payload)
            .await?
            .json(path)
    }

    fn json_payload<B: Serialize + ?Sized>(path: &str, body: &B) -> CfResult<Payload> {
        serde_json::to_string(body).map(Payload::Json).map_err(|e| {
            CfError::from_str(path, &format!("Failed to serialize request body: {}", e))
        })
    }

    // ── Execution ───────────────────────────────────────────────────────

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload,
    ) -> CfResult<CfResponse> {
        let url = self.url(path);
        let max_attempts = self.retry_config.max_attempts.max(1);

        for attempt in 0..max_attempts {
            match self.execute_once(&method, &url, query, &payload).await {
                Ok(response) => {
                    if response.is_success() {
                        return Ok(response);
                    }

                    let error = CfError::from_api_response(path, response.status, &response.body)
                        .with_request_id(response.request_id.clone());

                    if should_retry(&method, &error) && attempt + 1 < max_attempts {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "CF {} {} → {} (attempt {}/{}) - retrying in {}ms",
                            method,
                            path,
                            response.status,
                            attempt + 1,
                            max_attempts,
                            delay
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        continue;
                    }

                    return Err(error);
                }
                Err(e) => {
                    if should_retry(&method, &e) && attempt + 1 < max_attempts {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "CF {} {} transport error (attempt {}/{}): {} - retrying in {}ms",
                            method,
                            path,
                            attempt + 1,
                            max_attempts,
                            e.message,
                            delay
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(CfError::new(
            path,
            0,
            "MaxRetriesExceeded",
            &format!("Request failed after {} attempts", max_attempts),
        ))
    }

    async fn execute_once(
        &self,
        method: &Method,
        url: &str,
        query: &[(&str, &str)],
        payload: &Payload,
    ) -> CfResult<CfResponse> {
        let token = self.tokens.token().await?;
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut req = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .header(REQUEST_ID_HEADER, &request_id);

        if !query.is_empty() {
            req = req.query(query);
        }

        req = match payload {
            Payload::Empty => req,
            Payload::Json(body) => req
                .header("Content-Type", "application/json")
                .body(body.clone()),
            Payload::Bits {
                field,
                file_name,
                bytes,
            } => {
                let part = multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("application/zip")
                    .map_err(|e| CfError::transport(url, &e))?;
                req.multipart(multipart::Form::new().part(*field, part))
            }
        };

        debug!("CF {} {} [{}]", method, url, request_id);
        let resp = req.send().await.map_err(|e| {
            CfError::transport(url, &e).with_request_id(Some(request_id.clone()))
        })?;

        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.map_err(|e| {
            CfError::transport(url, &e).with_request_id(Some(request_id.clone()))
        })?;
        debug!("CF {} {} → {}", method, url, status);

        Ok(CfResponse {
            status,
            location,
            body,
            request_id: Some(request_id),
        })
    }

    /// Exponential backoff, full jitter when enabled.
    fn calculate_backoff(&self, attempt: u32) -> u64 {
        let base = self.retry_config.initial_backoff_ms;
        let max = self.retry_config.max_backoff_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt));
        let capped = exponential.min(max);

        if self.retry_config.jitter {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            rng.gen_range(0..=capped)
        } else {
            capped
        }
    }
}

impl std::fmt::Debug for CfClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CfClient")
            .field("base_url", &self.base_url)
            .field("retry_config", &self.retry_config)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
