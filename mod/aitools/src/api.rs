use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use stitchline_core::ServiceError;

use crate::model::PromptResponse;
use crate::service::AiService;

/// Shared application state.
pub type AppState = Arc<AiService>;

/// Build the AI tools API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/optimize-schedule", post(optimize_schedule))
        .route("/predict-bottlenecks", post(predict_bottlenecks))
}

async fn optimize_schedule(
    State(svc): State<AppState>,
    Json(data): Json<serde_json::Value>,
) -> Result<Json<PromptResponse>, ServiceError> {
    svc.optimize_schedule(data)
        .await
        .map(Json)
        .map_err(ServiceError::from)
}

async fn predict_bottlenecks(
    State(svc): State<AppState>,
    Json(data): Json<serde_json::Value>,
) -> Result<Json<PromptResponse>, ServiceError> {
    svc.predict_bottlenecks(data)
        .await
        .map(Json)
        .map_err(ServiceError::from)
}
