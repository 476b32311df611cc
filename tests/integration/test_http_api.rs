use futures::StreamExt;
use launchpad::api::auth::ACCESS_TOKEN_ENV;
use launchpad::api::client::ACCESS_TOKEN_HEADER;
use launchpad::api::{ApiError, HttpReleaseApi, ReleaseApi, TokenStore};
use launchpad::core::config::ApiConfig;
use launchpad::core::entities::{ReleaseOutcome, ReleaseParams, ReleaseRequest};
use launchpad::core::{ConsoleReporter, ReleaseOrchestrator};
use launchpad::human::ConsoleInterviewer;
use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "tok_test";

/// Client pointed at the mock server with a token file in a temp dir.
fn build_api(server: &MockServer, token_dir: &TempDir, with_token: bool) -> HttpReleaseApi {
    env::remove_var(ACCESS_TOKEN_ENV);
    let token_file = token_dir.path().join("tokens");
    if with_token {
        fs::write(&token_file, json!({ "access_token": TOKEN }).to_string()).unwrap();
    }
    let config = ApiConfig {
        base_url: server.uri(),
        builder_url: "https://builder.test".to_string(),
    };
    HttpReleaseApi::new(&config, TokenStore::with_file(token_file))
}

#[tokio::test]
#[serial]
async fn test_fetch_revisions_sends_token_and_keeps_order() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/apps/a_1/revisions"))
        .and(header(ACCESS_TOKEN_HEADER, TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "revisions": [
                { "id": "r2", "tag": "v2", "created_at": "2026-02-14T11:00:00Z" },
                { "id": "r1", "tag": "v1" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let revisions = api.fetch_revisions("a_1").await.unwrap();

    let ids: Vec<&str> = revisions.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r2", "r1"]);
    assert!(revisions[0].created_at.is_some());
}

#[tokio::test]
#[serial]
async fn test_create_release_posts_request_body() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    let request = ReleaseRequest {
        revision_id: "r1".to_string(),
        app_id: "a_1".to_string(),
        version: "1.0.0".to_string(),
        release_notes: "notes".to_string(),
        discovery_list: false,
        channel: "experimental".to_string(),
    };
    Mock::given(method("POST"))
        .and(path("/releases"))
        .and(header(ACCESS_TOKEN_HEADER, TOKEN))
        .and(body_json(json!({
            "revision_id": "r1",
            "app_id": "a_1",
            "version": "1.0.0",
            "release_notes": "notes",
            "discovery_list": false,
            "channel": "experimental"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "rel_9" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let created = api.create_release(&request).await.unwrap();

    assert_eq!(created.id, "rel_9");
}

#[tokio::test]
#[serial]
async fn test_release_logs_arrive_as_lines() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/promotions/rel_9/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fetching\ncompiling\n\ndone"))
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let lines: Vec<String> = api
        .open_release_logs("rel_9")
        .await
        .unwrap()
        .map(|line| line.unwrap())
        .collect()
        .await;

    assert_eq!(lines, vec!["fetching", "compiling", "", "done"]);
}

#[tokio::test]
#[serial]
async fn test_release_logs_tolerate_invalid_utf8_and_crlf() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/promotions/rel_1/logs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(b"step 1\r\ncaf\xe9 built\nstep 3\n".to_vec()),
        )
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let lines: Vec<Result<String, ApiError>> =
        api.open_release_logs("rel_1").await.unwrap().collect().await;

    let lines: Vec<String> = lines.into_iter().map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["step 1", "caf\u{FFFD} built", "step 3"]);
}

#[tokio::test]
#[serial]
async fn test_release_with_non_utf8_log_reaches_status_check() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "rel_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/promotions/rel_1/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"step 1\ncaf\xe9 built\nstep 3\n".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/promotions/rel_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "complete" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let orchestrator = ReleaseOrchestrator::new(
        Arc::new(api),
        Arc::new(ConsoleInterviewer::new()),
        Arc::new(ConsoleReporter::new()),
    );
    let params = ReleaseParams {
        project_dir: project_dir.path().to_path_buf(),
        project_id: Some("a_1".to_string()),
        revision_id: Some("r1".to_string()),
        ..ReleaseParams::default()
    };

    let outcome = orchestrator.run(params).await.unwrap();

    assert_eq!(
        outcome,
        ReleaseOutcome::Released {
            release_id: "rel_1".to_string(),
            listed: false
        }
    );
}

#[tokio::test]
#[serial]
async fn test_promotion_status_is_decoded() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/promotions/rel_9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "complete" })))
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let status = api.get_promotion_status("rel_9").await.unwrap();

    assert!(status.is_complete());
}

#[tokio::test]
#[serial]
async fn test_get_project_returns_identity() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/apps/a_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a_1",
            "name": "demo",
            "alias": "demo-app"
        })))
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let project = api.get_project("a_1").await.unwrap();

    assert_eq!(project.name.as_deref(), Some("demo"));
    assert_eq!(project.alias.as_deref(), Some("demo-app"));
}

#[tokio::test]
#[serial]
async fn test_missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, false);
    let err = api.fetch_revisions("a_1").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
#[serial]
async fn test_rejected_token_maps_to_unauthenticated() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/releases"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let request = ReleaseRequest {
        revision_id: "r1".to_string(),
        app_id: "a_1".to_string(),
        version: String::new(),
        release_notes: String::new(),
        discovery_list: false,
        channel: "experimental".to_string(),
    };
    let err = api.create_release(&request).await.unwrap_err();

    assert!(err.is_unauthenticated());
}

#[tokio::test]
#[serial]
async fn test_unknown_project_maps_to_not_found() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/apps/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let err = api.get_project("missing").await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    let token_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/promotions/rel_9"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let api = build_api(&server, &token_dir, true);
    let err = api.get_promotion_status("rel_9").await.unwrap_err();

    match err {
        ApiError::Server { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
