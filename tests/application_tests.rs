mod common;

use cf_operations::cf_waiter::HasOperationStatus;
use cf_operations::{OperationsConfig, OperationsError};
use common::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_app_lookup(server: &MockServer, name: &str, guid: &str) {
    Mock::given(method("GET"))
        .and(path("/v3/apps"))
        .and(query_param("names", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"total_results": 1, "total_pages": 1, "next": null},
            "resources": [{"guid": guid, "name": name, "state": "STARTED"}]
        })))
        .mount(server)
        .await;
}

async fn mount_app_delete(server: &MockServer, guid: &str, job: &str) {
    Mock::given(method("DELETE"))
        .and(path(format!("/v3/apps/{}", guid)))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Location", format!("{}/v3/jobs/{}", server.uri(), job).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_delete_application_waits_for_job() {
    let server = MockServer::start().await;
    mount_app_lookup(&server, "my-app", "app-1").await;
    mount_app_delete(&server, "app-1", "job-1").await;
    mount_get_sequence(
        &server,
        "/v3/jobs/job-1",
        vec![
            v3_job("job-1", "PROCESSING", json!([])),
            v3_job("job-1", "PROCESSING", json!([])),
            v3_job("job-1", "COMPLETE", json!([])),
        ],
    )
    .await;

    let ops = operations(&server, fast_config());
    ops.delete_application("my-app").await.unwrap();

    assert_eq!(count(&server, "GET", "/v3/jobs/job-1").await, 3);
}

#[tokio::test]
async fn test_delete_application_surfaces_job_failure_verbatim() {
    let server = MockServer::start().await;
    mount_app_lookup(&server, "my-app", "app-1").await;
    mount_app_delete(&server, "app-1", "job-1").await;
    mount_get_sequence(
        &server,
        "/v3/jobs/job-1",
        vec![
            v3_job("job-1", "PROCESSING", json!([])),
            v3_job(
                "job-1",
                "FAILED",
                json!([{"code": 10001, "title": "CF-SomeError", "detail": "something broke"}]),
            ),
        ],
    )
    .await;

    let ops = operations(&server, fast_config());
    let err = ops.delete_application("my-app").await.unwrap_err();

    match err {
        OperationsError::Failed { ref detail, .. } => {
            assert_eq!(detail, "CF-SomeError(10001): something broke")
        }
        ref other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Application my-app failed during deletion: CF-SomeError(10001): something broke"
    );
    assert_eq!(count(&server, "GET", "/v3/jobs/job-1").await, 2);
}

#[tokio::test]
async fn test_delete_application_by_guid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"total_results": 0, "total_pages": 0, "next": null},
            "resources": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/apps/app-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guid": "app-9", "name": "worker", "state": "STOPPED"
        })))
        .mount(&server)
        .await;
    mount_app_delete(&server, "app-9", "job-9").await;
    mount_get_sequence(&server, "/v3/jobs/job-9", vec![v3_job("job-9", "COMPLETE", json!([]))]).await;

    let ops = operations(&server, fast_config());
    ops.delete_application("app-9").await.unwrap();
}

#[tokio::test]
async fn test_delete_unknown_application_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"total_results": 0, "total_pages": 0, "next": null},
            "resources": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/apps/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"code": 10010, "title": "CF-ResourceNotFound", "detail": "App not found"}]
        })))
        .mount(&server)
        .await;

    let ops = operations(&server, fast_config());
    let err = ops.delete_application("ghost").await.unwrap_err();

    assert!(matches!(err, OperationsError::NotFound { .. }));
    assert_eq!(err.to_string(), "Application ghost does not exist");
    assert_eq!(count(&server, "DELETE", "/v3/apps/ghost").await, 0);
}

#[tokio::test]
async fn test_stage_package_returns_droplet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/builds"))
        .respond_with(ResponseTemplate::new(201).set_body_json(build("build-1", "STAGING", None, None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_sequence(
        &server,
        "/v3/builds/build-1",
        vec![
            build("build-1", "STAGING", None, None),
            build("build-1", "STAGED", None, Some("droplet-1")),
        ],
    )
    .await;

    let ops = operations(&server, fast_config());
    let staged = ops.stage_package("pkg-1", "my-app").await.unwrap();

    assert_eq!(staged.state, "STAGED");
    assert_eq!(staged.droplet.map(|d| d.guid), Some("droplet-1".to_string()));
    assert_eq!(count(&server, "GET", "/v3/builds/build-1").await, 2);
}

#[tokio::test]
async fn test_stage_package_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/builds"))
        .respond_with(ResponseTemplate::new(201).set_body_json(build("build-1", "STAGING", None, None)))
        .mount(&server)
        .await;
    mount_get_sequence(
        &server,
        "/v3/builds/build-1",
        vec![build("build-1", "FAILED", Some("NoAppDetectedError"), None)],
    )
    .await;

    let ops = operations(&server, fast_config());
    let err = ops.stage_package("pkg-1", "my-app").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Application my-app failed during staging: NoAppDetectedError"
    );
}

#[tokio::test]
async fn test_stage_package_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/builds"))
        .respond_with(ResponseTemplate::new(201).set_body_json(build("build-1", "STAGING", None, None)))
        .mount(&server)
        .await;
    mount_get_sequence(&server, "/v3/builds/build-1", vec![build("build-1", "STAGING", None, None)])
        .await;

    let config = OperationsConfig {
        staging_timeout_ms: 80,
        ..fast_config()
    };
    let ops = operations(&server, config);
    let err = ops.stage_package("pkg-1", "my-app").await.unwrap_err();

    assert!(matches!(err, OperationsError::TimedOut { .. }));
    assert_eq!(err.to_string(), "Application my-app timed out during staging");
    assert!(count(&server, "GET", "/v3/builds/build-1").await >= 2);
}

#[tokio::test]
async fn test_poll_error_ends_the_wait() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/builds"))
        .respond_with(ResponseTemplate::new(201).set_body_json(build("build-1", "STAGING", None, None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/builds/build-1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{"code": 10003, "title": "CF-NotAuthorized", "detail": "You are not authorized to perform the requested action"}]
        })))
        .mount(&server)
        .await;

    let ops = operations(&server, fast_config());
    let err = ops.stage_package("pkg-1", "my-app").await.unwrap_err();

    let client_error = err.client_error().expect("client error");
    assert_eq!(client_error.code, 403);
    assert_eq!(client_error.error_code, "CF-NotAuthorized");
    assert_eq!(count(&server, "GET", "/v3/builds/build-1").await, 1);
}

#[tokio::test]
async fn test_upload_package_waits_until_ready() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/packages/pkg-1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package("pkg-1", "PROCESSING_UPLOAD")))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_sequence(
        &server,
        "/v3/packages/pkg-1",
        vec![package("pkg-1", "PROCESSING_UPLOAD"), package("pkg-1", "READY")],
    )
    .await;

    let ops = operations(&server, fast_config());
    let ready = ops
        .upload_package_and_wait("pkg-1", b"PK\x03\x04".to_vec())
        .await
        .unwrap();

    assert_eq!(ready.state, "READY");
    assert!(ready.operation_status().is_terminal());
    assert_eq!(count(&server, "GET", "/v3/packages/pkg-1").await, 2);
}

#[tokio::test]
async fn test_upload_already_ready_does_not_poll() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/packages/pkg-1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package("pkg-1", "READY")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/packages/pkg-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package("pkg-1", "READY")))
        .expect(0)
        .mount(&server)
        .await;

    let ops = operations(&server, fast_config());
    ops.upload_package_and_wait("pkg-1", vec![1, 2, 3]).await.unwrap();
}
