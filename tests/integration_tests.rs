// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use nexus_dashboard::config::{AppConfig, LifecycleConfig, MetricsConfig};
use nexus_dashboard::lifecycle::{LifecycleSimulator, default_entities};
use nexus_dashboard::metrics_sim::MetricsSimulator;
use nexus_dashboard::routes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[metrics]
resource_tick_ms = 50
network_tick_ms = 80
process_tick_ms = 120

[lifecycle]
service_latency_ms = 50
container_latency_ms = 40
"#;

fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

struct TestApp {
    app: axum::Router,
    metrics: Arc<MetricsSimulator>,
    lifecycle: Arc<LifecycleSimulator>,
    ws_connections: Arc<AtomicUsize>,
}

fn test_app() -> TestApp {
    let config = test_app_config();
    test_app_with(&config.metrics, &config.lifecycle)
}

fn test_app_with(metrics_config: &MetricsConfig, lifecycle_config: &LifecycleConfig) -> TestApp {
    let metrics = Arc::new(MetricsSimulator::new(metrics_config));
    let lifecycle = Arc::new(LifecycleSimulator::new(default_entities(), lifecycle_config));
    let ws_connections = Arc::new(AtomicUsize::new(0));
    let app = routes::app(metrics.clone(), lifecycle.clone(), ws_connections.clone());
    TestApp {
        app,
        metrics,
        lifecycle,
        ws_connections,
    }
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> (TestServer, TestApp) {
    let app = test_app();
    let server = TestServer::builder()
        .http_transport()
        .try_build(app.app.clone())
        .unwrap();
    (server, app)
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("nexus-dashboard: simulated server dashboard");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("nexus-dashboard")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_metrics_endpoint_within_bounds() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let json: serde_json::Value = server.get("/api/metrics").await.json();
    let field = |name: &str| json[name].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&field("cpu")));
    assert!((20.0..=90.0).contains(&field("memory")));
    assert!((10.0..=95.0).contains(&field("storage")));
    assert!((30.0..=80.0).contains(&field("temperature")));
    assert!(json["uptimeSecs"].as_u64().unwrap() >= 15 * 24 * 60 * 60);
}

#[tokio::test]
async fn test_inventory_endpoints() {
    let server = TestServer::try_new(test_app().app).unwrap();

    let network: serde_json::Value = server.get("/api/network").await.json();
    assert_eq!(network.as_array().unwrap().len(), 2);
    assert_eq!(network[0]["name"], "eth0");

    let processes: serde_json::Value = server.get("/api/processes").await.json();
    assert_eq!(processes.as_array().unwrap().len(), 5);

    let storage: serde_json::Value = server.get("/api/storage").await.json();
    assert_eq!(storage["summary"]["totalGb"], 1750);
    assert_eq!(storage["summary"]["usedGb"], 950);
    assert_eq!(storage["devices"][2]["health"], "warning");
}

#[tokio::test]
async fn test_summary_endpoint() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let json: serde_json::Value = server.get("/api/summary").await.json();
    assert_eq!(json["services"]["total"], 6);
    assert_eq!(json["services"]["byStatus"]["running"], 4);
    assert_eq!(json["services"]["byStatus"]["error"], 1);
    assert_eq!(json["containers"]["byStatus"]["paused"], 1);
    assert_eq!(json["interfacesConnected"], 2);
    assert_eq!(json["interfacesTotal"], 2);
}

#[tokio::test]
async fn test_list_services_with_query() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let json: serde_json::Value = server
        .get("/api/services")
        .add_query_param("q", "cache")
        .await
        .json();
    let entities = json["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["id"], "redis");
    assert_eq!(entities[0]["status"], "running");
    // Counts cover the whole kind, not just the matches.
    assert_eq!(json["counts"]["total"], 6);

    let json: serde_json::Value = server.get("/api/containers").await.json();
    assert_eq!(json["entities"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_get_entity() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let json: serde_json::Value = server.get("/api/entities/db_1").await.json();
    assert_eq!(json["kind"], "container");
    assert_eq!(json["metadata"]["image"], "postgres:15");
    assert!(json.get("pendingTarget").is_none());
    assert_eq!(
        json["allowedActions"],
        serde_json::json!(["stop", "restart", "pause"])
    );

    let json: serde_json::Value = server.get("/api/entities/filebrowser").await.json();
    assert_eq!(json["allowedActions"], serde_json::json!(["start"]));

    let response = server.get("/api/entities/missing").expect_failure().await;
    response.assert_status(StatusCode::NOT_FOUND);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "entity_not_found");
    assert_eq!(json["message"], "entity 'missing' not found");
}

#[tokio::test]
async fn test_issue_command_accepted_and_resolves() {
    let t = test_app();
    let server = TestServer::try_new(t.app.clone()).unwrap();

    let response = server.post("/api/entities/nodejs/start").await;
    response.assert_status(StatusCode::ACCEPTED);
    let ticket: serde_json::Value = response.json();
    assert_eq!(ticket["interimStatus"], "starting");
    assert_eq!(ticket["targetStatus"], "running");
    assert_eq!(ticket["resolvesInMs"], 50);

    let json: serde_json::Value = server.get("/api/entities/nodejs").await.json();
    assert_eq!(json["status"], "starting");

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    let json: serde_json::Value = server.get("/api/entities/nodejs").await.json();
    assert_eq!(json["status"], "running");
    assert!(json["resourceUsage"]["cpuPercent"].as_f64().unwrap() > 0.0);
    assert_eq!(t.lifecycle.pending_count(), 0);
}

#[tokio::test]
async fn test_entity_detail_reflects_pending_command() {
    let server = TestServer::try_new(test_app().app).unwrap();

    server
        .post("/api/entities/db_1/pause")
        .await
        .assert_status(StatusCode::ACCEPTED);
    let json: serde_json::Value = server.get("/api/entities/db_1").await.json();
    assert_eq!(json["status"], "running");
    assert_eq!(json["pendingTarget"], "paused");
    assert_eq!(json["allowedActions"], serde_json::json!(["unpause"]));
    server
        .post("/api/entities/db_1/stop")
        .expect_failure()
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/api/entities/nodejs/start")
        .await
        .assert_status(StatusCode::ACCEPTED);
    let json: serde_json::Value = server.get("/api/entities/nodejs").await.json();
    assert_eq!(json["status"], "starting");
    assert_eq!(json["pendingTarget"], "running");
    assert_eq!(
        json["allowedActions"],
        serde_json::json!(["stop", "restart", "pause"])
    );
    server
        .post("/api/entities/nodejs/stop")
        .await
        .assert_status(StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_issue_command_errors() {
    let t = test_app();
    let server = TestServer::try_new(t.app.clone()).unwrap();

    let response = server.post("/api/entities/ghost/start").expect_failure().await;
    response.assert_status(StatusCode::NOT_FOUND);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "entity_not_found");
    assert_eq!(json["message"], "entity 'ghost' not found");

    let response = server.post("/api/entities/nginx/start").expect_failure().await;
    response.assert_status(StatusCode::CONFLICT);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "invalid_transition");

    let response = server.post("/api/entities/nginx/explode").expect_failure().await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "unknown_action");

    t.lifecycle.dispose();
    let response = server.post("/api/entities/nginx/stop").expect_failure().await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_resume_alias_accepted() {
    let server = TestServer::try_new(test_app().app).unwrap();
    let response = server.post("/api/entities/backup_1/resume").await;
    response.assert_status(StatusCode::ACCEPTED);
    let ticket: serde_json::Value = response.json();
    assert_eq!(ticket["action"], "unpause");
}

// --- WebSocket message tests (require http_transport + ws feature) ---

async fn receive_json(ws: &mut axum_test::TestWebSocket) -> serde_json::Value {
    let text = tokio::time::timeout(tokio::time::Duration::from_secs(3), ws.receive_text())
        .await
        .expect("timed out waiting for JSON");
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_ws_metrics_sends_initial_state_then_updates() {
    let (server, t) = test_server_with_http();
    let mut ws = server
        .get_websocket("/ws/metrics")
        .await
        .into_websocket()
        .await;

    let first = receive_json(&mut ws).await;
    assert_eq!(first["type"], "resources");
    assert!(first["data"]["cpu"].as_f64().is_some());
    assert_eq!(receive_json(&mut ws).await["type"], "interfaces");
    assert_eq!(receive_json(&mut ws).await["type"], "processes");

    // The connection holds a lease, so ticks keep arriving.
    let update = receive_json(&mut ws).await;
    assert!(update["type"].is_string());
    assert!(t.metrics.is_running());
    assert_eq!(t.ws_connections.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_ws_events_streams_command_progress() {
    let (server, _t) = test_server_with_http();
    let mut ws = server
        .get_websocket("/ws/events")
        .await
        .into_websocket()
        .await;

    let welcome = receive_json(&mut ws).await;
    assert_eq!(welcome["type"], "registry");
    assert_eq!(welcome["entities"].as_array().unwrap().len(), 12);

    server
        .post("/api/entities/monitor_1/start")
        .await
        .assert_status(StatusCode::ACCEPTED);

    let interim = receive_json(&mut ws).await;
    assert_eq!(interim["type"], "entityChanged");
    assert_eq!(interim["entity"]["id"], "monitor_1");
    assert_eq!(interim["entity"]["status"], "starting");

    let resolved = receive_json(&mut ws).await;
    assert_eq!(resolved["type"], "entityChanged");
    assert_eq!(resolved["entity"]["status"], "running");

    let outcome = receive_json(&mut ws).await;
    assert_eq!(outcome["type"], "commandCompleted");
    assert_eq!(outcome["entityId"], "monitor_1");
    assert_eq!(outcome["success"], true);
}
