mod common;

use cf_operations::cf_waiter::CancellationToken;
use cf_operations::{OperationsConfig, OperationsError};
use common::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_v2_delete(server: &MockServer, resource_path: &str, job: serde_json::Value) {
    Mock::given(method("DELETE"))
        .and(path(resource_path))
        .and(query_param("async", "true"))
        .and(query_param("recursive", "true"))
        .respond_with(ResponseTemplate::new(202).set_body_json(job))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_delete_organization_waits_for_job() {
    let server = MockServer::start().await;
    mount_v2_delete(&server, "/v2/organizations/org-1", v2_job("job-1", "queued")).await;
    mount_get_sequence(
        &server,
        "/v2/jobs/job-1",
        vec![
            v2_job("job-1", "queued"),
            v2_job("job-1", "running"),
            v2_job("job-1", "finished"),
        ],
    )
    .await;

    let ops = operations(&server, fast_config());
    ops.delete_organization("org-1").await.unwrap();

    assert_eq!(count(&server, "GET", "/v2/jobs/job-1").await, 3);
}

#[tokio::test]
async fn test_delete_space_failure_detail_is_verbatim() {
    let server = MockServer::start().await;
    mount_v2_delete(&server, "/v2/spaces/space-1", v2_job("job-2", "queued")).await;
    mount_get_sequence(
        &server,
        "/v2/jobs/job-2",
        vec![
            v2_job("job-2", "running"),
            v2_failed_job("job-2", 10001, "CF-SomeError", "something broke"),
        ],
    )
    .await;

    let ops = operations(&server, fast_config());
    let err = ops.delete_space("space-1").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Space space-1 failed during deletion: CF-SomeError(10001): something broke"
    );
}

#[tokio::test]
async fn test_delete_route_finished_job_is_not_polled() {
    let server = MockServer::start().await;
    mount_v2_delete(&server, "/v2/routes/route-1", v2_job("job-3", "finished")).await;
    Mock::given(method("GET"))
        .and(path("/v2/jobs/job-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(v2_job("job-3", "finished")))
        .expect(0)
        .mount(&server)
        .await;

    let ops = operations(&server, fast_config());
    ops.delete_route("route-1").await.unwrap();
}

#[tokio::test]
async fn test_unknown_job_state_keeps_polling() {
    let server = MockServer::start().await;
    mount_v2_delete(&server, "/v2/organizations/org-1", v2_job("job-4", "queued")).await;
    mount_get_sequence(
        &server,
        "/v2/jobs/job-4",
        vec![
            v2_job("job-4", "paused"),
            v2_job("job-4", "paused"),
            v2_job("job-4", "finished"),
        ],
    )
    .await;

    let ops = operations(&server, fast_config());
    ops.delete_organization("org-1").await.unwrap();

    assert_eq!(count(&server, "GET", "/v2/jobs/job-4").await, 3);
}

#[tokio::test]
async fn test_delete_organization_times_out() {
    let server = MockServer::start().await;
    mount_v2_delete(&server, "/v2/organizations/org-1", v2_job("job-5", "queued")).await;
    mount_get_sequence(&server, "/v2/jobs/job-5", vec![v2_job("job-5", "running")]).await;

    let config = OperationsConfig {
        job_timeout_ms: 60,
        ..fast_config()
    };
    let ops = operations(&server, config);
    let err = ops.delete_organization("org-1").await.unwrap_err();

    match err {
        OperationsError::TimedOut {
            ref subject,
            action,
            elapsed,
        } => {
            assert_eq!(subject, "Organization org-1");
            assert_eq!(action, "deletion");
            assert!(elapsed >= Duration::from_millis(60));
        }
        ref other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_space_cancelled_mid_wait() {
    let server = MockServer::start().await;
    mount_v2_delete(&server, "/v2/spaces/space-1", v2_job("job-6", "queued")).await;
    mount_get_sequence(&server, "/v2/jobs/job-6", vec![v2_job("job-6", "running")]).await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let ops = operations(&server, fast_config()).with_cancellation(token);
    let err = ops.delete_space("space-1").await.unwrap_err();

    assert!(matches!(err, OperationsError::Cancelled { .. }));
    assert_eq!(err.to_string(), "Space space-1 deletion was cancelled");
    assert!(count(&server, "GET", "/v2/jobs/job-6").await >= 1);
}

#[tokio::test]
async fn test_delete_rejected_by_api() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/organizations/org-1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": 10003,
            "description": "You are not authorized to perform the requested action",
            "error_code": "CF-NotAuthorized"
        })))
        .mount(&server)
        .await;

    let ops = operations(&server, fast_config());
    let err = ops.delete_organization("org-1").await.unwrap_err();

    assert_eq!(err.client_error().map(|e| e.error_code.as_str()), Some("CF-NotAuthorized"));
}
