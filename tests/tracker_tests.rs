//! Integration tests for the gated tracking session.
//!
//! These tests drive the Tracker against a mockito server and check the
//! gating contract: active calls reach the server, inactive calls never do.

use mlflow_tracking_client::client::{AsyncMlflowClient, AsyncMlflowClientImpl};
use mlflow_tracking_client::{MlflowApiError, MlflowClient, Tracker, TrackingSwitch};
use mockito::{Matcher, Server, ServerGuard};
use std::collections::HashMap;
use std::fs;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

fn tracker_for(server: &ServerGuard, active: bool) -> Tracker {
    Tracker::with_client(
        MlflowClient::with_base_url(server.url(), None),
        TrackingSwitch::new(active),
        "Default".to_string(),
    )
}

/// Mock the experiment lookup and run creation that start_tracking performs.
fn mock_run_start(server: &mut ServerGuard, run_name: &str) -> (mockito::Mock, mockito::Mock) {
    let experiment_mock = server
        .mock("GET", "/api/2.0/mlflow/experiments/get-by-name")
        .match_query(Matcher::UrlEncoded(
            "experiment_name".into(),
            "Default".into(),
        ))
        .with_status(200)
        .with_body(r#"{"experiment": {"experiment_id": "42", "name": "Default"}}"#)
        .create();

    let run_mock = server
        .mock("POST", "/api/2.0/mlflow/runs/create")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "experiment_id": "42",
            "run_name": run_name
        })))
        .with_status(200)
        .with_body(format!(
            r#"{{
            "run": {{
                "info": {{
                    "run_id": "run-001",
                    "run_name": "{}",
                    "experiment_id": "42",
                    "status": "RUNNING",
                    "start_time": 1700000000000,
                    "artifact_uri": "mlflow-artifacts:/42/run-001/artifacts"
                }}
            }}
        }}"#,
            run_name
        ))
        .create();

    (experiment_mock, run_mock)
}

#[test]
fn test_start_tracking_active_creates_run() {
    init_logging();
    let mut server = Server::new();
    let (experiment_mock, run_mock) = mock_run_start(&mut server, "r1");

    let tracker = tracker_for(&server, true);
    let active = tracker
        .start_tracking(Some("r1"), &HashMap::new())
        .unwrap()
        .expect("tracking is active, a run handle must come back");

    // Experiment lookup, then run creation, both against the configured endpoint
    experiment_mock.assert();
    run_mock.assert();
    assert_eq!(active.run_id, "run-001");
    assert_eq!(active.run_name.as_deref(), Some("r1"));
    assert_eq!(tracker.active_run(), Some(active));
}

#[test]
fn test_start_tracking_inactive_never_calls_server() {
    init_logging();
    let mut server = Server::new();

    let experiment_mock = server
        .mock("GET", "/api/2.0/mlflow/experiments/get-by-name")
        .match_query(Matcher::Any)
        .expect(0)
        .create();
    let run_mock = server
        .mock("POST", "/api/2.0/mlflow/runs/create")
        .expect(0)
        .create();

    let tracker = tracker_for(&server, false);
    let result = tracker.start_tracking(Some("r1"), &HashMap::new()).unwrap();

    experiment_mock.assert();
    run_mock.assert();
    assert!(result.is_none());
    assert_eq!(tracker.client().metrics().skipped_inactive_total(), 1);
}

#[test]
fn test_log_artifacts_inactive_never_uploads() {
    init_logging();
    let mut server = Server::new();

    let upload_mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create();

    let tracker = tracker_for(&server, false);
    let result = tracker.log_artifacts("/tmp/x", None);

    upload_mock.assert();
    assert!(matches!(result, Ok(None)));
}

#[test]
fn test_log_artifacts_without_active_run_is_invalid() {
    init_logging();
    let server = Server::new();

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("metrics.json"), b"{}").unwrap();

    let tracker = tracker_for(&server, true);
    let result = tracker.log_artifacts(dir.path(), None);

    assert!(matches!(result, Err(MlflowApiError::InvalidRequest(_))));
}

#[test]
fn test_toggle_changes_next_call_only() {
    init_logging();
    let mut server = Server::new();
    let (experiment_mock, run_mock) = mock_run_start(&mut server, "toggled");

    let update_mock = server
        .mock("POST", "/api/2.0/mlflow/runs/update")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "run_id": "run-001",
            "status": "FINISHED"
        })))
        .with_status(200)
        .with_body(r#"{"run_info": {"run_id": "run-001", "status": "FINISHED"}}"#)
        .expect(1)
        .create();

    let tracker = tracker_for(&server, true);
    tracker
        .start_tracking(Some("toggled"), &HashMap::new())
        .unwrap();

    // Disabled: end_tracking is skipped, the run stays active
    tracker.switch().disable();
    let skipped = tracker.end_tracking().unwrap();
    assert!(skipped.is_none());
    assert!(tracker.active_run().is_some());

    // Re-enabled: the next call goes through
    tracker.switch().enable();
    let ended = tracker.end_tracking().unwrap();
    assert_eq!(ended, Some(()));
    assert!(tracker.active_run().is_none());

    experiment_mock.assert();
    run_mock.assert();
    update_mock.assert();
}

#[test]
fn test_full_run_lifecycle_with_artifacts() {
    init_logging();
    let mut server = Server::new();
    let (experiment_mock, run_mock) = mock_run_start(&mut server, "lifecycle");

    let upload_mock = server
        .mock(
            "PUT",
            "/api/2.0/mlflow-artifacts/artifacts/42/run-001/artifacts/report.txt",
        )
        .with_status(200)
        .create();

    let update_mock = server
        .mock("POST", "/api/2.0/mlflow/runs/update")
        .with_status(200)
        .with_body(r#"{"run_info": {"run_id": "run-001", "status": "FINISHED"}}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report.txt"), b"accuracy: 0.93").unwrap();

    let mut tags = HashMap::new();
    tags.insert("stage".to_string(), "validation".to_string());

    let tracker = tracker_for(&server, true);
    tracker
        .start_tracking(Some("lifecycle"), &tags)
        .unwrap()
        .expect("run handle");

    let uploaded = tracker.log_artifacts(dir.path(), None).unwrap();
    assert_eq!(uploaded, Some(1));

    tracker.end_tracking().unwrap().expect("run ended");

    experiment_mock.assert();
    run_mock.assert();
    upload_mock.assert();
    update_mock.assert();

    let metrics = tracker.client().metrics();
    assert_eq!(metrics.runs_started_total(), 1);
    assert_eq!(metrics.runs_ended_total(), 1);
    assert_eq!(metrics.artifacts_uploaded_total(), 1);
    assert_eq!(metrics.skipped_inactive_total(), 0);
}

#[test]
fn test_client_errors_propagate_through_gate() {
    init_logging();
    let mut server = Server::new();

    let experiment_mock = server
        .mock("GET", "/api/2.0/mlflow/experiments/get-by-name")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("Internal server error")
        .create();

    let tracker = tracker_for(&server, true);
    let result = tracker.start_tracking(None, &HashMap::new());

    experiment_mock.assert();
    assert!(matches!(
        result,
        Err(MlflowApiError::ApiError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_async_client_round_trip() {
    init_logging();
    let mut server = Server::new_async().await;

    let experiment_mock = server
        .mock("GET", "/api/2.0/mlflow/experiments/get-by-name")
        .match_query(Matcher::UrlEncoded(
            "experiment_name".into(),
            "Default".into(),
        ))
        .with_status(200)
        .with_body(r#"{"experiment": {"experiment_id": "42", "name": "Default"}}"#)
        .create_async()
        .await;

    let client = AsyncMlflowClientImpl::new(MlflowClient::with_base_url(server.url(), None));
    let experiment = client.get_experiment_by_name("Default").await.unwrap();

    experiment_mock.assert_async().await;
    assert_eq!(experiment.experiment_id, "42");
}
