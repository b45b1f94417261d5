use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page};

use crate::model::{CheckPoint, CreateCheckPoint};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkpoints", get(list_checkpoints).post(create_checkpoint))
        .route("/checkpoints/entry-points", get(entry_points))
        .route("/checkpoints/default", get(default_checkpoint))
        .route(
            "/checkpoints/{id}",
            get(get_checkpoint)
                .patch(update_checkpoint)
                .delete(delete_checkpoint),
        )
}

#[derive(Deserialize)]
struct CheckpointQuery {
    #[serde(flatten)]
    params: ListQuery,
}

async fn create_checkpoint(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateCheckPoint>,
) -> Result<Json<CheckPoint>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.create_checkpoint(body))
}

async fn get_checkpoint(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<CheckPoint>, ApiError> {
    ok_json(state.factory(&factory)?.get_checkpoint(&id))
}

async fn list_checkpoints(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<CheckpointQuery>,
) -> Result<Json<Page<CheckPoint>>, ApiError> {
    ok_json(state.factory(&factory)?.list_checkpoints(&q.params))
}

/// All production-entry checkpoints, in registry order.
async fn entry_points(
    State(state): State<AppState>,
    Path(factory): Path<String>,
) -> Result<Json<Vec<CheckPoint>>, ApiError> {
    ok_json(state.factory(&factory)?.list_entry_points())
}

/// The default station for a new scan session (may be null).
async fn default_checkpoint(
    State(state): State<AppState>,
    Path(factory): Path<String>,
) -> Result<Json<Option<CheckPoint>>, ApiError> {
    ok_json(state.factory(&factory)?.default_checkpoint())
}

async fn update_checkpoint(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<CheckPoint>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.update_checkpoint(&id, patch))
}

async fn delete_checkpoint(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gate.check_module(&headers, "production", "delete")?;
    state
        .factory(&factory)?
        .delete_checkpoint(&id)
        .map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
