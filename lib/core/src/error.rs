use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Unified error type shared by every module's service and API layer.
///
/// A variant carries only the operator-facing message; the stable
/// machine-readable code and the HTTP status are derived from the
/// variant itself. Clients match on the `code` field of the JSON body,
/// never on the message text:
///
/// ```json
/// {"code": "INVALID_STATE", "message": "bundle 'QR...' is not assigned to a work order"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No entity with the given key. 404.
    #[error("{0}")]
    NotFound(String),

    /// A unique business key is already taken. 409.
    #[error("{0}")]
    Conflict(String),

    /// The request itself is malformed or out of range. 400.
    #[error("{0}")]
    Validation(String),

    /// The entity exists but is in the wrong state for this operation,
    /// e.g. scanning an unassigned bundle. 409.
    #[error("{0}")]
    InvalidState(String),

    /// Missing or unverifiable credentials. 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the gate says no. 403.
    #[error("{0}")]
    PermissionDenied(String),

    /// A backing store or collaborator failed underneath us. 503.
    #[error("{0}")]
    Dependency(String),

    /// Anything that indicates a bug or data inconsistency. 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    fn meta(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            Self::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::PermissionDenied(_) => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            Self::Dependency(_) => (StatusCode::SERVICE_UNAVAILABLE, "DEPENDENCY_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }

    /// Stable machine-readable code. Codes never change; messages may
    /// be reworded.
    pub fn error_code(&self) -> &'static str {
        self.meta().1
    }

    /// HTTP status this error surfaces as.
    pub fn status_code(&self) -> StatusCode {
        self.meta().0
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.meta();
        let body = serde_json::json!({
            "code": code,
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_stable_code_and_status() {
        let table: Vec<(ServiceError, StatusCode, &str)> = vec![
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT, "ALREADY_EXISTS"),
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            (ServiceError::InvalidState("x".into()), StatusCode::CONFLICT, "INVALID_STATE"),
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            (ServiceError::PermissionDenied("x".into()), StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            (
                ServiceError::Dependency("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "DEPENDENCY_UNAVAILABLE",
            ),
            (ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        ];
        for (err, status, code) in table {
            assert_eq!(err.status_code(), status, "{code}");
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = ServiceError::InvalidState("bundle 'QR1' is unassigned".into());
        assert_eq!(err.to_string(), "bundle 'QR1' is unassigned");
    }

    #[test]
    fn response_carries_the_mapped_status() {
        let resp = ServiceError::NotFound("qrcodes/QR1".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
