use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page};

use crate::model::{CreateInstruction, Instruction};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/instructions", get(list_instructions).post(create_instruction))
        .route("/instructions/search", get(search_instructions))
        .route(
            "/instructions/{id}",
            get(get_instruction)
                .patch(update_instruction)
                .delete(delete_instruction),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstructionQuery {
    #[serde(flatten)]
    params: ListQuery,
    machine_type: Option<String>,
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

async fn create_instruction(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateInstruction>,
) -> Result<Json<Instruction>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.create_instruction(body))
}

async fn get_instruction(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<Instruction>, ApiError> {
    ok_json(state.factory(&factory)?.get_instruction(&id))
}

async fn list_instructions(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<InstructionQuery>,
) -> Result<Json<Page<Instruction>>, ApiError> {
    ok_json(
        state
            .factory(&factory)?
            .list_instructions(&q.params, q.machine_type.as_deref()),
    )
}

async fn search_instructions(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Instruction>>, ApiError> {
    ok_json(state.factory(&factory)?.search_instructions(&q.q, q.limit))
}

async fn update_instruction(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Instruction>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.update_instruction(&id, patch))
}

async fn delete_instruction(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gate.check_module(&headers, "production", "delete")?;
    state
        .factory(&factory)?
        .delete_instruction(&id)
        .map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
