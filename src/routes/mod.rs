// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::lifecycle::LifecycleSimulator;
use crate::metrics_sim::MetricsSimulator;

pub use http::ApiError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) metrics: Arc<MetricsSimulator>,
    pub(crate) lifecycle: Arc<LifecycleSimulator>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    metrics: Arc<MetricsSimulator>,
    lifecycle: Arc<LifecycleSimulator>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        metrics,
        lifecycle,
        ws_connections,
    };
    Router::new()
        .route("/", get(|| async { "nexus-dashboard: simulated server dashboard" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/metrics", get(http::metrics_handler)) // GET /api/metrics
        .route("/api/network", get(http::network_handler)) // GET /api/network
        .route("/api/processes", get(http::processes_handler)) // GET /api/processes
        .route("/api/storage", get(http::storage_handler)) // GET /api/storage
        .route("/api/summary", get(http::summary_handler)) // GET /api/summary
        .route("/api/services", get(http::list_services)) // GET /api/services?q=
        .route("/api/containers", get(http::list_containers)) // GET /api/containers?q=
        .route("/api/entities/{id}", get(http::get_entity)) // GET /api/entities/{id}
        .route("/api/entities/{id}/{action}", post(http::issue_command)) // POST /api/entities/{id}/{action}
        .route("/ws/metrics", get(ws::ws_metrics)) // WS /ws/metrics
        .route("/ws/events", get(ws::ws_events)) // WS /ws/events
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
