use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page};

use crate::model::{CreateWorkOrder, WorkOrder};
use crate::service::workorder::WorkOrderFilters;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workorders", get(list_workorders).post(create_workorder))
        .route("/workorders/search", get(search_workorders))
        .route(
            "/workorders/{id}",
            get(get_workorder)
                .patch(update_workorder)
                .delete(delete_workorder),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkOrderQuery {
    #[serde(flatten)]
    params: ListQuery,
    production_line: Option<String>,
    garment_type: Option<String>,
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

async fn create_workorder(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateWorkOrder>,
) -> Result<Json<WorkOrder>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.create_workorder(body))
}

async fn get_workorder(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<WorkOrder>, ApiError> {
    ok_json(state.factory(&factory)?.get_workorder(&id))
}

async fn list_workorders(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<WorkOrderQuery>,
) -> Result<Json<Page<WorkOrder>>, ApiError> {
    let filters = WorkOrderFilters {
        production_line: q.production_line,
        garment_type: q.garment_type,
    };
    ok_json(state.factory(&factory)?.list_workorders(&q.params, &filters))
}

async fn search_workorders(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<WorkOrder>>, ApiError> {
    ok_json(state.factory(&factory)?.search_workorders(&q.q, q.limit))
}

async fn update_workorder(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<WorkOrder>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.update_workorder(&id, patch))
}

async fn delete_workorder(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gate.check_module(&headers, "production", "delete")?;
    state
        .factory(&factory)?
        .delete_workorder(&id)
        .map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
