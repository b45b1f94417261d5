use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page};

use crate::model::{CreateWorker, Worker};
use crate::service::worker::WorkerFilters;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workers", get(list_workers).post(create_worker))
        .route("/workers/search", get(search_workers))
        .route(
            "/workers/{id}",
            get(get_worker).patch(update_worker).delete(delete_worker),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkerQuery {
    #[serde(flatten)]
    params: ListQuery,
    designation: Option<String>,
    production_line: Option<String>,
    active: Option<bool>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(default = "default_search_limit")]
    limit: usize,
}

fn default_search_limit() -> usize {
    20
}

async fn create_worker(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateWorker>,
) -> Result<Json<Worker>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.create_worker(body))
}

async fn get_worker(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<Worker>, ApiError> {
    ok_json(state.factory(&factory)?.get_worker(&id))
}

async fn list_workers(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<WorkerQuery>,
) -> Result<Json<Page<Worker>>, ApiError> {
    let filters = WorkerFilters {
        designation: q.designation,
        production_line: q.production_line,
        active: q.active,
    };
    ok_json(state.factory(&factory)?.list_workers(&q.params, &filters))
}

async fn search_workers(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Worker>>, ApiError> {
    ok_json(state.factory(&factory)?.search_workers(&q.q, q.limit))
}

async fn update_worker(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Worker>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.update_worker(&id, patch))
}

async fn delete_worker(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gate.check_module(&headers, "production", "delete")?;
    state.factory(&factory)?.delete_worker(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
