use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use stitchline_core::ServiceError;

use crate::api::AppState;
use crate::service::gate::extract_bearer;

/// Paths reachable without a token.
const PUBLIC_PATHS: &[&str] = &[
    "/auth/v1/login",
    "/auth/v1/token/refresh",
    "/health",
    "/version",
];

/// Bearer-token middleware. Verified [`crate::model::Claims`] are
/// inserted as a request extension for handlers to pick up.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if PUBLIC_PATHS.iter().any(|p| path.starts_with(p)) {
        return next.run(req).await;
    }

    let Some(token) = extract_bearer(req.headers()).map(str::to_string) else {
        return ServiceError::Unauthorized("missing authorization header".into()).into_response();
    };

    match svc.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => ServiceError::from(e).into_response(),
    }
}
