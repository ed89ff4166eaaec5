//! End-to-end deployment tests.
//!
//! Runs the full pipeline — plan validation, HTTP clients, orchestrator,
//! health polling — against a stub control plane on an ephemeral port.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};

use gantry_core::{DeployRequest, DeploymentPlan};
use gantry_deploy::{DeployOutcome, Deployer};
use gantry_remote::RemoteClient;

#[derive(Default)]
struct ControlPlane {
    puts: AtomicU32,
    versions: AtomicU32,
    updates: AtomicU32,
    health_calls: AtomicU32,
}

async fn put_object(
    State(state): State<Arc<ControlPlane>>,
    Path((_bucket, _key)): Path<(String, String)>,
    _body: Bytes,
) -> StatusCode {
    state.puts.fetch_add(1, Ordering::SeqCst);
    StatusCode::CREATED
}

async fn create_version(
    State(state): State<Arc<ControlPlane>>,
    Path(_app): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.versions.fetch_add(1, Ordering::SeqCst);
    // Confirm a label that differs from the requested one.
    let requested = body["version_label"].as_str().unwrap_or_default();
    Json(serde_json::json!({ "version_label": format!("{requested}-1") }))
}

async fn update_environment(
    State(state): State<Arc<ControlPlane>>,
    Path(env): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.updates.fetch_add(1, Ordering::SeqCst);
    Json(serde_json::json!({
        "environment": env,
        "version_label": body["version_label"],
        "status": "Updating",
    }))
}

async fn health(
    State(state): State<Arc<ControlPlane>>,
    Path(_env): Path<String>,
) -> Json<serde_json::Value> {
    let calls = state.health_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let (status, health, color) = if calls >= 3 {
        ("Ready", "Ok", "Green")
    } else {
        ("Updating", "Info", "Grey")
    };
    Json(serde_json::json!({
        "status": status,
        "health_status": health,
        "color": color,
    }))
}

async fn spawn_control_plane(state: Arc<ControlPlane>) -> String {
    let router = axum::Router::new()
        .route("/v1/buckets/{bucket}/objects/{key}", put(put_object))
        .route("/v1/applications/{app}/versions", post(create_version))
        .route("/v1/environments/{env}/update", post(update_environment))
        .route("/v1/environments/{env}/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn request(endpoint: String, dir: &tempfile::TempDir) -> DeployRequest {
    let bundle = dir.path().join("dist.zip");
    std::fs::write(&bundle, b"zip bytes").unwrap();
    DeployRequest {
        region: Some("us-west-1".into()),
        application_name: Some("app".into()),
        environment_name: Some("env".into()),
        source_bundle: Some(bundle),
        endpoint: Some(endpoint),
        check_interval_ms: Some(1),
        ..Default::default()
    }
}

fn deployer(plan: &DeploymentPlan) -> Deployer<RemoteClient, RemoteClient, RemoteClient> {
    Deployer::new(
        RemoteClient::from_options(&plan.client).unwrap(),
        RemoteClient::from_options(&plan.client).unwrap(),
        RemoteClient::from_options(&plan.client).unwrap(),
    )
}

#[tokio::test]
async fn deploy_converges_against_stub_control_plane() {
    let state = Arc::new(ControlPlane::default());
    let endpoint = spawn_control_plane(state.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let plan = DeploymentPlan::from_request(request(endpoint, &dir)).unwrap();
    let outcome = deployer(&plan).deploy_plan(&plan).await.unwrap();

    match outcome {
        DeployOutcome::Converged { ack, health, samples } => {
            assert_eq!(ack.environment, "env");
            // The confirmed label, not the derived "dist".
            assert_eq!(ack.version_label, "dist-1");
            assert!(health.is_ready());
            assert_eq!(samples, 3);
        }
        other => panic!("expected Converged, got {other:?}"),
    }

    assert_eq!(state.puts.load(Ordering::SeqCst), 1);
    assert_eq!(state.versions.load(Ordering::SeqCst), 1);
    assert_eq!(state.updates.load(Ordering::SeqCst), 1);
    assert_eq!(state.health_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn no_wait_deploy_never_polls() {
    let state = Arc::new(ControlPlane::default());
    let endpoint = spawn_control_plane(state.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let mut req = request(endpoint, &dir);
    req.wait_for_deploy = Some(false);
    let plan = DeploymentPlan::from_request(req).unwrap();
    let outcome = deployer(&plan).deploy_plan(&plan).await.unwrap();

    match outcome {
        DeployOutcome::Accepted(ack) => assert_eq!(ack.version_label, "dist-1"),
        other => panic!("expected Accepted, got {other:?}"),
    }
    assert_eq!(state.updates.load(Ordering::SeqCst), 1);
    assert_eq!(state.health_calls.load(Ordering::SeqCst), 0);
}
