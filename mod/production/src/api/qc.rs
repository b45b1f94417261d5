use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;

use crate::model::{QcChecklist, QcItemResult, QcReport};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/qc/checklist", post(checklist))
        .route("/qc/submit", post(submit))
        .route("/qc/reasons", get(reasons))
}

#[derive(Deserialize)]
struct ChecklistBody {
    code: String,
}

#[derive(Deserialize)]
struct SubmitBody {
    code: String,
    items: Vec<QcItemResult>,
}

/// Materialize the QC checklist for an eligible bundle.
async fn checklist(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Json(body): Json<ChecklistBody>,
) -> Result<Json<QcChecklist>, ApiError> {
    ok_json(state.factory(&factory)?.qc_checklist(&body.code))
}

/// Validate and record a checklist submission. Never touches the
/// bundle's status.
async fn submit(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SubmitBody>,
) -> Result<Json<QcReport>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.submit_qc(&body.code, body.items))
}

/// The factory's configured failure reason list.
async fn reasons(
    State(state): State<AppState>,
    Path(factory): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    ok_json(state.factory(&factory)?.qc_failure_reasons())
}
