//! Integration tests for the cleaner binary.
//!
//! Each test starts a mock EPGStation server, runs the binary against it and
//! checks the exit code, the log output and the requests the server received.

use std::time::Duration;

use assert_cmd::Command;
use chrono::Utc;
use predicates::prelude::*;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOUR_MS: i64 = 3_600_000;

/// Get a Command instance for the cleaner binary with a clean environment.
#[allow(deprecated)]
fn cleaner_cmd() -> Command {
    let mut cmd = Command::cargo_bin("epgstation-cleaner").expect("Failed to find binary");
    cmd.env_clear()
        .env("LOG_FORMAT", "json")
        .timeout(Duration::from_secs(20));
    cmd
}

/// Two recordings 400 hours old: id 1 is unprotected, id 2 is protected.
fn scenario_records() -> Value {
    let start = Utc::now().timestamp_millis() - 400 * HOUR_MS;
    json!({
        "records": [
            {
                "id": 1,
                "name": "unprotected",
                "isEncoding": false,
                "isProtected": false,
                "startAt": start,
                "endAt": start + HOUR_MS,
                "videoFiles": [
                    {"id": 11, "name": "TS", "filename": "one.m2ts", "type": "ts", "size": 1000},
                    {"id": 12, "name": "H.264", "filename": "one.mp4", "type": "encoded", "size": 500}
                ]
            },
            {
                "id": 2,
                "name": "protected",
                "isEncoding": false,
                "isProtected": true,
                "startAt": start,
                "endAt": start + HOUR_MS,
                "videoFiles": [
                    {"id": 21, "name": "TS", "filename": "two.m2ts", "type": "ts", "size": 1000},
                    {"id": 22, "name": "H.264", "filename": "two.mp4", "type": "encoded", "size": 500}
                ]
            }
        ],
        "total": 2
    })
}

async fn mount_listing(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/recorded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn deleted_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.method.as_str() == "DELETE")
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deletes_only_ts_file_of_unprotected_recording() {
    let server = MockServer::start().await;
    mount_listing(&server, scenario_records()).await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/videos/\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    cleaner_cmd()
        .env("EPGSTATION_BASE_URL", server.uri())
        .env("RETAIN_DURATION", "336h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete videoFile"))
        .stdout(predicate::str::contains("one.m2ts"))
        .stdout(predicate::str::contains("two.m2ts").not());

    assert_eq!(deleted_paths(&server).await, vec!["/api/videos/11".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_sends_no_deletes() {
    let server = MockServer::start().await;
    mount_listing(&server, scenario_records()).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cleaner_cmd()
        .env("EPGSTATION_BASE_URL", server.uri())
        .env("IS_DRY_RUN", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run mode is enabled"))
        .stdout(predicate::str::contains("(Dry Run) Delete videoFile"));

    assert!(deleted_paths(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_flag_overrides_environment() {
    let server = MockServer::start().await;
    mount_listing(&server, scenario_records()).await;

    cleaner_cmd()
        .env("EPGSTATION_BASE_URL", server.uri())
        .env("IS_DRY_RUN", "false")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("(Dry Run) Delete videoFile"));

    assert!(deleted_paths(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_delete_is_logged_and_run_succeeds() {
    let start = Utc::now().timestamp_millis() - 500 * HOUR_MS;
    let body = json!({
        "records": [
            {
                "id": 5,
                "name": "first",
                "isProtected": false,
                "startAt": start,
                "endAt": start + HOUR_MS,
                "videoFiles": [
                    {"id": 51, "name": "TS", "filename": "a.m2ts", "type": "ts", "size": 1},
                    {"id": 52, "name": "H.264", "filename": "a.mp4", "type": "encoded", "size": 1}
                ]
            },
            {
                "id": 6,
                "name": "second",
                "isProtected": false,
                "startAt": start,
                "endAt": start + HOUR_MS,
                "videoFiles": [
                    {"id": 61, "name": "TS", "filename": "b.m2ts", "type": "ts", "size": 1},
                    {"id": 62, "name": "H.264", "filename": "b.mp4", "type": "encoded", "size": 1}
                ]
            }
        ],
        "total": 2
    });
    let server = MockServer::start().await;
    mount_listing(&server, body).await;
    Mock::given(method("DELETE"))
        .and(path("/api/videos/51"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk busy"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/videos/61"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    cleaner_cmd()
        .env("EPGSTATION_BASE_URL", server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to delete videoFile"))
        .stdout(predicate::str::contains("disk busy"))
        .stdout(predicate::str::contains("Cleanup finished with failed deletions"));

    assert_eq!(
        deleted_paths(&server).await,
        vec!["/api/videos/51".to_string(), "/api/videos/61".to_string()]
    );
}

#[test]
fn test_unreachable_server_exits_non_zero() {
    cleaner_cmd()
        .env("EPGSTATION_BASE_URL", "http://127.0.0.1:1")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Failed to fetch recorded programs"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_listing_exits_non_zero_without_deleting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recorded"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cleaner_cmd()
        .env("EPGSTATION_BASE_URL", server.uri())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("failed to decode response"));
}

#[test]
fn test_invalid_configuration_exits_non_zero() {
    cleaner_cmd()
        .env("LOG_LEVEL", "LOUD")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Failed to load configuration"));

    cleaner_cmd()
        .env("RETAIN_DURATION", "two weeks")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_help_lists_options() {
    cleaner_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--retain"))
        .stdout(predicate::str::contains("--strict-tls"));
}
