use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::service::dashboard::DashboardSummary;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(summary))
}

async fn summary(
    State(state): State<AppState>,
    Path(factory): Path<String>,
) -> Result<Json<DashboardSummary>, ApiError> {
    ok_json(state.factory(&factory)?.dashboard_summary())
}
