pub mod check;
pub mod login;
pub mod me;
pub mod middleware;
pub mod users;

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use stitchline_core::ServiceError;

use crate::service::{AuthError, AuthService};

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(login::routes())
        .merge(me::routes())
        .merge(users::routes())
        .merge(check::routes())
}

/// Wrap a Result<T, AuthError> into an API response.
pub(crate) fn ok_json<T: Serialize>(
    result: Result<T, AuthError>,
) -> Result<Json<T>, ServiceError> {
    result.map(Json).map_err(ServiceError::from)
}
