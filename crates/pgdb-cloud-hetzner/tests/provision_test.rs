//! Provisioning tests against an in-process stub of the Hetzner API.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use pgdb_cloud_hetzner::{HcloudClient, HetznerError, ProvisionOptions, provision};
use pgdb_config::ConfigStore;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct StubHetzner {
    firewall_posts: AtomicUsize,
    volume_posts: AtomicUsize,
    server_posts: AtomicUsize,
    server_gets: AtomicUsize,
    /// Number of status polls answered `initializing` before `running`.
    polls_until_running: usize,
    omit_ipv4: bool,
    fail_volume_create: bool,
    last_server_create: Mutex<Option<Value>>,
}

async fn create_firewall(
    State(stub): State<Arc<StubHetzner>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.firewall_posts.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "firewall": { "id": 31, "name": body["name"] } }))
}

async fn create_volume(
    State(stub): State<Arc<StubHetzner>>,
    Json(body): Json<Value>,
) -> Response {
    stub.volume_posts.fetch_add(1, Ordering::SeqCst);
    if stub.fail_volume_create {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            "volume limit exceeded".to_string(),
        )
            .into_response();
    }
    Json(json!({ "volume": { "id": 52, "name": body["name"], "size": body["size"] } }))
        .into_response()
}

async fn create_server(
    State(stub): State<Arc<StubHetzner>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.server_posts.fetch_add(1, Ordering::SeqCst);
    *stub.last_server_create.lock().unwrap() = Some(body.clone());
    Json(json!({
        "server": { "id": 77, "name": body["name"], "status": "initializing", "public_net": null }
    }))
}

async fn get_server(
    State(stub): State<Arc<StubHetzner>>,
    Path(id): Path<u64>,
) -> Json<Value> {
    let answered = stub.server_gets.fetch_add(1, Ordering::SeqCst);
    if answered < stub.polls_until_running {
        return Json(json!({
            "server": { "id": id, "name": "pgdb-test", "status": "initializing", "public_net": null }
        }));
    }

    let public_net = if stub.omit_ipv4 {
        json!({})
    } else {
        json!({ "ipv4": { "ip": "203.0.113.9" } })
    };
    Json(json!({
        "server": { "id": id, "name": "pgdb-test", "status": "running", "public_net": public_net }
    }))
}

async fn spawn_stub(stub: Arc<StubHetzner>) -> String {
    let router = Router::new()
        .route("/firewalls", post(create_firewall))
        .route("/volumes", post(create_volume))
        .route("/servers", post(create_server))
        .route("/servers/{id}", get(get_server))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::at_path(dir.path().join("config.json"))
}

#[tokio::test]
async fn test_successful_run_derives_daemon_url_and_persists_default_alias() {
    let stub = Arc::new(StubHetzner::default());
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let api = HcloudClient::with_base_url("test-token", &base);
    let options = ProvisionOptions {
        ssh_key_id: Some(42),
        ..Default::default()
    };

    let result = provision(&api, &store, &options).await.unwrap();

    assert_eq!(result.provider, "hetzner");
    assert_eq!(result.daemon_url, "http://203.0.113.9:8080");
    assert_eq!(result.server.status, "running");
    assert_eq!(result.server.ipv4, "203.0.113.9");
    assert_eq!(result.volume.size_gb, 20);
    assert_eq!(result.firewall.id, 31);
    assert!(!result.next_steps.is_empty());

    let config = store.load().unwrap();
    assert_eq!(config.default_server, "default");
    assert_eq!(
        config.servers.get("default").map(String::as_str),
        Some("http://203.0.113.9:8080")
    );
}

#[tokio::test]
async fn test_server_create_references_prior_resources() {
    let stub = Arc::new(StubHetzner::default());
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let api = HcloudClient::with_base_url("test-token", &base);
    let options = ProvisionOptions {
        name: Some("acct".to_string()),
        ssh_key_id: Some(42),
        ..Default::default()
    };

    provision(&api, &store_in(&dir), &options).await.unwrap();

    let body = stub.last_server_create.lock().unwrap().clone().unwrap();
    assert_eq!(body["name"], "acct");
    assert_eq!(body["server_type"], "cpx21");
    assert_eq!(body["image"], "ubuntu-24.04");
    assert_eq!(body["location"], "nbg1");
    assert_eq!(body["ssh_keys"], json!([42]));
    assert_eq!(body["firewalls"], json!([{ "firewall": 31 }]));
    assert_eq!(body["volumes"], json!([52]));
    let user_data = body["user_data"].as_str().unwrap();
    assert!(user_data.contains("ufw allow 8080/tcp"));
}

#[tokio::test]
async fn test_missing_ssh_key_id_makes_no_remote_calls() {
    let stub = Arc::new(StubHetzner::default());
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = HcloudClient::with_base_url("test-token", &base);

    for ssh_key_id in [None, Some(0), Some(-3)] {
        let options = ProvisionOptions {
            ssh_key_id,
            ..Default::default()
        };
        let err = provision(&api, &store_in(&dir), &options).await.unwrap_err();
        assert!(matches!(err, HetznerError::MissingSshKeyId));
    }

    assert_eq!(stub.firewall_posts.load(Ordering::SeqCst), 0);
    assert_eq!(stub.volume_posts.load(Ordering::SeqCst), 0);
    assert_eq!(stub.server_posts.load(Ordering::SeqCst), 0);
    assert_eq!(stub.server_gets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_readiness_timeout_is_distinct_and_poll_count_is_bounded() {
    let stub = Arc::new(StubHetzner {
        polls_until_running: usize::MAX,
        ..Default::default()
    });
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let api = HcloudClient::with_base_url("test-token", &base);
    let options = ProvisionOptions {
        ssh_key_id: Some(42),
        poll_interval: Duration::from_millis(50),
        ready_timeout: Duration::from_millis(200),
        ..Default::default()
    };

    let err = provision(&api, &store, &options).await.unwrap_err();
    assert!(matches!(
        err,
        HetznerError::ReadinessTimeout { server_id: 77, .. }
    ));

    // deadline / interval polls, plus at most one straggler
    let polls = stub.server_gets.load(Ordering::SeqCst);
    assert!((4..=5).contains(&polls), "unexpected poll count: {polls}");

    // nothing persisted on failure
    assert!(store.load().unwrap().servers.is_empty());
}

#[tokio::test]
async fn test_server_becomes_running_after_a_few_polls() {
    let stub = Arc::new(StubHetzner {
        polls_until_running: 3,
        ..Default::default()
    });
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let api = HcloudClient::with_base_url("test-token", &base);
    let options = ProvisionOptions {
        ssh_key_id: Some(42),
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    };

    let result = provision(&api, &store_in(&dir), &options).await.unwrap();
    assert_eq!(result.server.status, "running");
    assert_eq!(stub.server_gets.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_running_server_without_ipv4_fails() {
    let stub = Arc::new(StubHetzner {
        omit_ipv4: true,
        ..Default::default()
    });
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let api = HcloudClient::with_base_url("test-token", &base);
    let options = ProvisionOptions {
        ssh_key_id: Some(42),
        ..Default::default()
    };

    let err = provision(&api, &store, &options).await.unwrap_err();
    assert!(matches!(err, HetznerError::NoPublicIpv4));
    assert!(store.load().unwrap().servers.is_empty());
}

#[tokio::test]
async fn test_api_failure_aborts_sequence_without_rollback() {
    let stub = Arc::new(StubHetzner {
        fail_volume_create: true,
        ..Default::default()
    });
    let base = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let api = HcloudClient::with_base_url("test-token", &base);
    let options = ProvisionOptions {
        ssh_key_id: Some(42),
        ..Default::default()
    };

    let err = provision(&api, &store_in(&dir), &options).await.unwrap_err();
    match err {
        HetznerError::Api { status, path, body, .. } => {
            assert_eq!(status, 422);
            assert_eq!(path, "/volumes");
            assert!(body.contains("volume limit exceeded"));
        }
        other => panic!("expected Api error, got: {other}"),
    }

    // the firewall created before the failing step is left in place
    assert_eq!(stub.firewall_posts.load(Ordering::SeqCst), 1);
    assert_eq!(stub.server_posts.load(Ordering::SeqCst), 0);
}
