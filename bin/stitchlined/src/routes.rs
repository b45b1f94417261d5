//! Route registration — collects all module routes + system endpoints.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use auth::service::AuthService;

/// Build the complete router with all routes.
///
/// Each module's routes are nested under `/{module_name}`; the JWT
/// middleware wraps everything (the middleware itself excludes the
/// public login/health paths).
pub fn build_router(
    auth_service: Arc<AuthService>,
    module_routes: Vec<(&str, Router)>,
) -> Router {
    let mut app: Router = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }

    app.layer(middleware::from_fn_with_state(
        auth_service,
        auth::api::middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "stitchlined",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
