use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};

use stitchline_core::ServiceError;

use crate::model::{Claims, SessionCheckpoint, UserInfo};
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/checkpoint", get(session_checkpoint))
}

/// The authenticated user's own record.
async fn me(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserInfo>, ServiceError> {
    ok_json(svc.get_user(&claims.sub).map(UserInfo::from))
}

/// The default scan-session checkpoint for the authenticated user.
/// Returns `needsSelection` with the candidate list when the choice
/// cannot be made automatically.
async fn session_checkpoint(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionCheckpoint>, ServiceError> {
    ok_json(svc.resolve_session_checkpoint(&claims.sub))
}
