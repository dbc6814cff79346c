#![allow(dead_code)]

use cf_operations::cf_client::{CfClient, CfConnectionConfig, RetryConfig, StaticToken};
use cf_operations::{CloudFoundryOperations, OperationsConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Millisecond intervals so waits finish quickly.
pub fn fast_config() -> OperationsConfig {
    OperationsConfig {
        initial_interval_ms: 5,
        max_interval_ms: 20,
        job_timeout_ms: 5_000,
        service_timeout_ms: 5_000,
        staging_timeout_ms: 5_000,
        upload_timeout_ms: 5_000,
    }
}

pub fn operations(server: &MockServer, config: OperationsConfig) -> CloudFoundryOperations {
    let conn = CfConnectionConfig::new(server.uri()).with_retry(RetryConfig::none());
    let client = CfClient::new(&conn, Arc::new(StaticToken::new("test-token"))).unwrap();
    CloudFoundryOperations::new(client, config).unwrap()
}

/// Answer `GET {path}` with each body once, in order; the last one repeats.
pub async fn mount_get_sequence(server: &MockServer, get_path: &str, bodies: Vec<Value>) {
    let last = bodies.len().saturating_sub(1);
    for (i, body) in bodies.into_iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path(get_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        let mock = if i < last { mock.up_to_n_times(1) } else { mock };
        mock.mount(server).await;
    }
}

/// Requests received for `verb {path}`.
pub async fn count(server: &MockServer, verb: &str, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == request_path)
        .count()
}

pub fn v2_job(guid: &str, status: &str) -> Value {
    json!({
        "metadata": {"guid": guid, "url": format!("/v2/jobs/{}", guid)},
        "entity": {"guid": guid, "status": status}
    })
}

pub fn v2_failed_job(guid: &str, code: i64, error_code: &str, description: &str) -> Value {
    json!({
        "metadata": {"guid": guid, "url": format!("/v2/jobs/{}", guid)},
        "entity": {
            "guid": guid,
            "status": "failed",
            "error": "Use of entity>error is deprecated in favor of entity>error_details.",
            "error_details": {"code": code, "description": description, "error_code": error_code}
        }
    })
}

pub fn v3_job(guid: &str, state: &str, errors: Value) -> Value {
    json!({
        "guid": guid,
        "operation": "app.delete",
        "state": state,
        "errors": errors,
        "warnings": [],
        "links": {"self": {"href": format!("https://api.example.com/v3/jobs/{}", guid)}}
    })
}

pub fn service_instance(guid: &str, name: &str, last_operation: Value) -> Value {
    json!({
        "metadata": {"guid": guid, "url": format!("/v2/service_instances/{}", guid)},
        "entity": {
            "name": name,
            "space_guid": "space-1",
            "service_plan_guid": "plan-1",
            "type": "managed_service_instance",
            "last_operation": last_operation
        }
    })
}

pub fn build(guid: &str, state: &str, error: Option<&str>, droplet: Option<&str>) -> Value {
    json!({
        "guid": guid,
        "state": state,
        "error": error,
        "package": {"guid": "pkg-1"},
        "droplet": droplet.map(|d| json!({"guid": d}))
    })
}

pub fn package(guid: &str, state: &str) -> Value {
    json!({"guid": guid, "type": "bits", "state": state, "data": {}})
}
