pub mod checkpoint;
pub mod dashboard;
pub mod instruction;
pub mod machine;
pub mod qc;
pub mod qrcode;
pub mod scan;
pub mod worker;
pub mod workorder;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use stitchline_core::{AccessGate, ServiceError};

use crate::FactoryRegistry;
use crate::service::{ProductionError, ProductionService};

/// Shared application state: the per-factory service registry plus the
/// injected access gate.
#[derive(Clone)]
pub struct AppState {
    pub factories: Arc<FactoryRegistry>,
    pub gate: Arc<dyn AccessGate>,
}

impl AppState {
    /// Resolve the factory path segment to its service instance.
    pub(crate) fn factory(&self, id: &str) -> Result<Arc<ProductionService>, ApiError> {
        self.factories.get(id).map_err(ApiError::from)
    }
}

/// Build the production API router. All routes are scoped by factory:
/// `/production/v1/{factory}/...`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/v1/{factory}", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(machine::routes())
        .merge(worker::routes())
        .merge(instruction::routes())
        .merge(checkpoint::routes())
        .merge(workorder::routes())
        .merge(qrcode::routes())
        .merge(scan::routes())
        .merge(qc::routes())
        .merge(dashboard::routes())
}

/// Standard API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError {
            code: err.status_code().as_u16(),
            message: err.to_string(),
        }
    }
}

impl From<ProductionError> for ApiError {
    fn from(err: ProductionError) -> Self {
        ServiceError::from(err).into()
    }
}

/// Wrap a Result<T, ProductionError> into an API response.
pub(crate) fn ok_json<T: Serialize>(
    result: Result<T, ProductionError>,
) -> Result<Json<T>, ApiError> {
    result.map(Json).map_err(ApiError::from)
}
