use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use stitchline_core::ServiceError;

use crate::model::Claims;
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/check", post(check))
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub module: String,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

/// Check whether the authenticated user may perform `action` in `module`.
/// The UI uses this to show or hide whole screens.
async fn check(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ServiceError> {
    ok_json(
        svc.can_access_module(&claims.sub, &body.module, &body.action)
            .map(|allowed| CheckResponse { allowed }),
    )
}
