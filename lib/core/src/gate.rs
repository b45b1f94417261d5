//! Access gate trait — the seam between business modules and the
//! User/Role Gate.
//!
//! Modules do NOT depend on the auth crate. They only know this trait;
//! the concrete implementation (backed by the auth service) is injected
//! at startup time.

use axum::http::HeaderMap;

use crate::ServiceError;

/// Pluggable access gate. Business modules call this to answer the two
/// authorization questions this system asks:
///
/// - may the actor behind these request headers use `module`/`action`?
/// - may the actor record bundle passes at a given checkpoint?
///
/// A system administrator passes both checks unconditionally.
pub trait AccessGate: Send + Sync + 'static {
    /// Check a per-module permission (`action` is one of `read`, `write`,
    /// `delete`). Returns `Ok(())` if allowed.
    fn check_module(
        &self,
        headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> Result<(), ServiceError>;

    /// Check that the actor may operate at the given checkpoint.
    fn check_checkpoint(
        &self,
        headers: &HeaderMap,
        checkpoint_id: &str,
    ) -> Result<(), ServiceError>;
}

/// A no-op gate that allows everything. Used for testing and for
/// deployments without per-station restrictions.
pub struct AllowAll;

impl AccessGate for AllowAll {
    fn check_module(
        &self,
        _headers: &HeaderMap,
        _module: &str,
        _action: &str,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    fn check_checkpoint(
        &self,
        _headers: &HeaderMap,
        _checkpoint_id: &str,
    ) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// A gate that denies everything. Used for testing.
pub struct DenyAll;

impl AccessGate for DenyAll {
    fn check_module(
        &self,
        _headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::PermissionDenied(format!(
            "{}:{} denied",
            module, action
        )))
    }

    fn check_checkpoint(
        &self,
        _headers: &HeaderMap,
        checkpoint_id: &str,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::PermissionDenied(format!(
            "checkpoint {} denied",
            checkpoint_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_gates_answer_both_questions() {
        let headers = HeaderMap::new();

        let open: &dyn AccessGate = &AllowAll;
        assert!(open.check_module(&headers, "production", "write").is_ok());
        assert!(open.check_checkpoint(&headers, "cp-1").is_ok());

        let closed: &dyn AccessGate = &DenyAll;
        assert!(matches!(
            closed.check_module(&headers, "production", "read"),
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(matches!(
            closed.check_checkpoint(&headers, "cp-1"),
            Err(ServiceError::PermissionDenied(_))
        ));
    }
}
