//! Scanning workflow endpoints: resolve a scanned code, then confirm a
//! checkpoint pass. The confirm step checks the operator's checkpoint
//! assignment through the access gate — a station operator can only
//! record passes where they are stationed.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
};
use serde::Deserialize;

use crate::model::BundleHistoryRecord;
use crate::service::lifecycle::BundleContext;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/scan/find", post(find_bundle))
        .route("/scan/confirm", post(confirm_pass))
}

#[derive(Deserialize)]
struct FindBody {
    code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBody {
    code: String,
    checkpoint_id: String,
}

/// Resolve a scanned code. Pure lookup — the operator reviews the
/// bundle before confirming.
async fn find_bundle(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    Json(body): Json<FindBody>,
) -> Result<Json<BundleContext>, ApiError> {
    ok_json(state.factory(&factory)?.find_bundle(&body.code))
}

/// Record the pass: status update + history append, atomically.
async fn confirm_pass(
    State(state): State<AppState>,
    Path(factory): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ConfirmBody>,
) -> Result<Json<BundleHistoryRecord>, ApiError> {
    state.gate.check_checkpoint(&headers, &body.checkpoint_id)?;
    ok_json(
        state
            .factory(&factory)?
            .confirm_pass(&body.code, &body.checkpoint_id),
    )
}
