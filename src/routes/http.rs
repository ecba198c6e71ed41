// GET/POST handlers: version, metrics, inventory, entities, commands

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::lifecycle::{CommandError, EntityFilter};
use crate::models::{ConnectionState, EntityAction, EntityKind, StatusCounts, UnknownAction};

/// Package version (from Cargo.toml at build time).
const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Package name (from Cargo.toml at build time).
const NAME: &str = env!("CARGO_PKG_NAME");

/// Error body: `{"error": "<code>", "message": "<text>"}`.
#[derive(Debug)]
pub enum ApiError {
    Command(CommandError),
    UnknownAction(UnknownAction),
}

impl From<CommandError> for ApiError {
    fn from(e: CommandError) -> Self {
        ApiError::Command(e)
    }
}

impl From<UnknownAction> for ApiError {
    fn from(e: UnknownAction) -> Self {
        ApiError::UnknownAction(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Command(e @ CommandError::EntityNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "entity_not_found", e.to_string())
            }
            ApiError::Command(e @ CommandError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "invalid_transition", e.to_string())
            }
            ApiError::Command(e @ CommandError::Disposed) => {
                (StatusCode::SERVICE_UNAVAILABLE, "disposed", e.to_string())
            }
            ApiError::UnknownAction(e) => (StatusCode::BAD_REQUEST, "unknown_action", e.to_string()),
        };
        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EntityList {
    entities: Vec<crate::models::ManagedEntity>,
    counts: StatusCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DashboardSummary {
    services: StatusCounts,
    containers: StatusCounts,
    interfaces_connected: usize,
    interfaces_total: usize,
}

/// GET /version — returns service name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/metrics — current resource snapshot plus derived uptime.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.resource_view())
}

pub(super) async fn network_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.interfaces())
}

pub(super) async fn processes_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.processes())
}

pub(super) async fn storage_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.storage())
}

/// GET /api/summary — entity counts by status per kind, interface connectivity.
pub(super) async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    let interfaces = state.metrics.interfaces();
    Json(DashboardSummary {
        services: state.lifecycle.count_by_status(Some(EntityKind::Service)),
        containers: state.lifecycle.count_by_status(Some(EntityKind::Container)),
        interfaces_connected: interfaces
            .iter()
            .filter(|i| i.connection_state == ConnectionState::Connected)
            .count(),
        interfaces_total: interfaces.len(),
    })
}

fn list_kind(state: &AppState, kind: EntityKind, query: ListQuery) -> Json<EntityList> {
    let mut filter = EntityFilter::all().kind(kind);
    filter.query = query.q;
    Json(EntityList {
        entities: state.lifecycle.list_entities(&filter),
        counts: state.lifecycle.count_by_status(Some(kind)),
    })
}

/// GET /api/services?q= — services matching the optional free-text query.
pub(super) async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    list_kind(&state, EntityKind::Service, query)
}

/// GET /api/containers?q= — containers matching the optional free-text query.
pub(super) async fn list_containers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    list_kind(&state, EntityKind::Container, query)
}

/// GET /api/entities/{id} — the entity, its pending target and the actions a command may use now.
pub(super) async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .lifecycle
        .entity_detail(&id)
        .map(Json)
        .ok_or(ApiError::Command(CommandError::EntityNotFound { id }))
}

/// POST /api/entities/{id}/{action} — 202 with a ticket; the outcome arrives on /ws/events.
pub(super) async fn issue_command(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let action: EntityAction = action.parse()?;
    let ticket = state.lifecycle.issue_command(&id, action)?;
    Ok((StatusCode::ACCEPTED, Json(ticket)))
}
