use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page};

use crate::model::{CreateMachine, Machine};
use crate::service::machine::MachineFilters;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/machines", get(list_machines).post(create_machine))
        .route("/machines/search", get(search_machines))
        .route(
            "/machines/{id}",
            get(get_machine).patch(update_machine).delete(delete_machine),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MachineQuery {
    #[serde(flatten)]
    params: ListQuery,
    machine_type: Option<String>,
    production_line: Option<String>,
    status: Option<String>,
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

async fn create_machine(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateMachine>,
) -> Result<Json<Machine>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.create_machine(body))
}

async fn get_machine(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<Machine>, ApiError> {
    ok_json(state.factory(&factory)?.get_machine(&id))
}

async fn list_machines(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<MachineQuery>,
) -> Result<Json<Page<Machine>>, ApiError> {
    let filters = MachineFilters {
        machine_type: q.machine_type,
        production_line: q.production_line,
        status: q.status,
    };
    ok_json(state.factory(&factory)?.list_machines(&q.params, &filters))
}

async fn search_machines(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Machine>>, ApiError> {
    ok_json(state.factory(&factory)?.search_machines(&q.q, q.limit))
}

async fn update_machine(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Machine>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.update_machine(&id, patch))
}

async fn delete_machine(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gate.check_module(&headers, "production", "delete")?;
    state.factory(&factory)?.delete_machine(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
