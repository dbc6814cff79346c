//! Bearer tokens for the Cloud Controller.
//!
//! Every request carries `Authorization: bearer <token>`. Where the token
//! comes from is behind [`TokenProvider`]:
//!
//! - [`StaticToken`]: a token obtained elsewhere (`cf oauth-token`, a test)
//! - [`ClientCredentialsTokenProvider`]: UAA `client_credentials` grant,
//!   cached until shortly before it expires

use crate::error::{CfError, CfResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid access token, without the `bearer ` prefix.
    async fn token(&self) -> CfResult<String>;
}

/// A fixed access token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token
            .strip_prefix("bearer ")
            .or_else(|| token.strip_prefix("Bearer "))
            .map(str::to_string)
            .unwrap_or(token);
        Self { token }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").field("token", &"***").finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> CfResult<String> {
        Ok(self.token.clone())
    }
}

/// Tokens are refreshed this long before they expire, or at half their
/// lifetime when that is shorter.
const REFRESH_BUFFER_SECS: i64 = 60;

/// An access token with its refresh deadline.
#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    /// Unix timestamp seconds.
    refresh_at: i64,
}

impl AccessToken {
    fn new(token: String, issued_at: i64, expires_in: i64) -> Self {
        let buffer = REFRESH_BUFFER_SECS.min(expires_in / 2);
        Self {
            token,
            refresh_at: issued_at + expires_in - buffer,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.refresh_at
    }
}

#[derive(Deserialize)]
struct UaaTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// UAA `client_credentials` grant with token caching.
pub struct ClientCredentialsTokenProvider {
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    http: Client,
    cached: Mutex<Option<AccessToken>>,
}

impl ClientCredentialsTokenProvider {
    /// `uaa_endpoint` is the UAA base URL, e.g. `https://uaa.sys.example.com`.
    pub fn new(uaa_endpoint: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            token_endpoint: format!("{}/oauth/token", uaa_endpoint.trim_end_matches('/')),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            http: Client::new(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> CfResult<AccessToken> {
        log::debug!("Requesting UAA token for client '{}'", self.client_id);
        let resp = self
            .http
            .post(&self.token_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CfError::transport(&self.token_endpoint, &e))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| CfError::transport(&self.token_endpoint, &e))?;
        if !(200..300).contains(&status) {
            return Err(CfError::auth_error(&format!(
                "UAA token request failed (HTTP {}): {}",
                status, body
            )));
        }

        let parsed: UaaTokenResponse = serde_json::from_str(&body).map_err(|e| {
            CfError::auth_error(&format!("Failed to parse UAA token response: {}", e))
        })?;
        Ok(AccessToken::new(
            parsed.access_token,
            Utc::now().timestamp(),
            parsed.expires_in.unwrap_or(3600),
        ))
    }
}

impl std::fmt::Debug for ClientCredentialsTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsTokenProvider")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn token(&self) -> CfResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(ref t) = *cached {
            if !t.is_expired() {
                return Ok(t.token.clone());
            }
        }
        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn static_token_strips_prefix() {
        let t = StaticToken::new("bearer abc.def");
        assert_eq!(t.token().await.unwrap(), "abc.def");
        assert_eq!(StaticToken::new("xyz").token().await.unwrap(), "xyz");
        assert!(!format!("{:?}", t).contains("abc"));
    }

    #[tokio::test]
    async fn client_credentials_token_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "expires_in": 600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ClientCredentialsTokenProvider::new(&server.uri(), "ci", "secret");
        assert_eq!(provider.token().await.unwrap(), "tok-1");
        assert_eq!(provider.token().await.unwrap(), "tok-1");
    }

    #[test]
    fn refresh_buffer_is_clamped_for_short_lifetimes() {
        assert_eq!(AccessToken::new("t".into(), 1_000, 3600).refresh_at, 4_540);
        assert_eq!(AccessToken::new("t".into(), 1_000, 30).refresh_at, 1_015);
        assert_eq!(AccessToken::new("t".into(), 1_000, 0).refresh_at, 1_000);

        let now = Utc::now().timestamp();
        assert!(!AccessToken::new("t".into(), now, 40).is_expired());
        assert!(AccessToken::new("t".into(), now - 30, 40).is_expired());
    }

    #[tokio::test]
    async fn short_lived_token_is_still_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-short",
                "token_type": "bearer",
                "expires_in": 30
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ClientCredentialsTokenProvider::new(&server.uri(), "ci", "secret");
        for _ in 0..3 {
            assert_eq!(provider.token().await.unwrap(), "tok-short");
        }
    }

    #[tokio::test]
    async fn client_credentials_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let provider = ClientCredentialsTokenProvider::new(&server.uri(), "ci", "wrong");
        let err = provider.token().await.unwrap_err();
        assert_eq!(err.code, 401);
        assert!(err.message.contains("Bad credentials"));
    }
}
