use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use stitchline_core::ServiceError;

use crate::model::TokenPair;
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Handle POST /auth/v1/login — verify credentials, issue a token pair.
async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let user = svc
        .verify_credentials(&body.username, &body.password)
        .map_err(ServiceError::from)?;
    info!(username = %user.username, role = user.role.tag(), "login");
    ok_json(svc.issue_tokens(&user))
}

/// Handle POST /auth/v1/token/refresh — rotate a refresh token.
async fn refresh(
    State(svc): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    ok_json(svc.refresh_tokens(&body.refresh_token))
}
