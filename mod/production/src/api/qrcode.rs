use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page};

use crate::model::{BundleHistoryRecord, QcReport, QrCode};
use crate::service::qrcode::{AssignCodes, QrCodeFilters};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/qrcodes", get(list_qrcodes))
        .route("/qrcodes/generate", post(generate_codes))
        .route("/qrcodes/assign", post(assign_codes))
        .route("/qrcodes/{id}", get(get_qrcode))
        .route("/qrcodes/{id}/history", get(bundle_history))
        .route("/qrcodes/{id}/qc-reports", get(qc_reports))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrCodeQuery {
    #[serde(flatten)]
    params: ListQuery,
    status: Option<String>,
    work_order_id: Option<String>,
}

#[derive(Deserialize)]
struct GenerateBody {
    count: i64,
}

async fn generate_codes(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<GenerateBody>,
) -> Result<Json<Vec<QrCode>>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.generate_codes(body.count))
}

async fn assign_codes(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AssignCodes>,
) -> Result<Json<Vec<QrCode>>, ApiError> {
    state.gate.check_module(&headers, "production", "write")?;
    ok_json(state.factory(&factory)?.assign_codes(body))
}

async fn get_qrcode(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<QrCode>, ApiError> {
    ok_json(state.factory(&factory)?.find_code(&id))
}

async fn list_qrcodes(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Query(q): Query<QrCodeQuery>,
) -> Result<Json<Page<QrCode>>, ApiError> {
    let filters = QrCodeFilters {
        status: q.status,
        work_order_id: q.work_order_id,
    };
    ok_json(state.factory(&factory)?.list_qrcodes(&q.params, &filters))
}

async fn bundle_history(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
) -> Result<Json<Vec<BundleHistoryRecord>>, ApiError> {
    ok_json(state.factory(&factory)?.bundle_history(&id))
}

async fn qc_reports(
    State(state): State<AppState>,
    Path((factory, id)): Path<(String, String)>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Page<QcReport>>, ApiError> {
    ok_json(state.factory(&factory)?.list_qc_reports(&id, &params))
}
