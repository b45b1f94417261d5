//! The user/role gate — answers "which station?" and "may they do this?".
//!
//! The pure rules live on [`Role`](crate::model::Role); this file wires
//! them to the service (lookup by user id) and to request headers via the
//! [`stitchline_core::AccessGate`] trait, which other modules consume
//! without depending on this crate.

use std::sync::Arc;

use axum::http::HeaderMap;

use stitchline_core::{AccessGate, ServiceError};

use crate::model::{SessionCheckpoint, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Resolve the default scan-session checkpoint for a user.
    pub fn resolve_session_checkpoint(
        &self,
        user_id: &str,
    ) -> Result<SessionCheckpoint, AuthError> {
        let user: User = self.get_record("users", user_id)?;
        Ok(user.role.session_checkpoint())
    }

    /// Check a per-module permission for a user.
    pub fn can_access_module(
        &self,
        user_id: &str,
        module: &str,
        action: &str,
    ) -> Result<bool, AuthError> {
        let user: User = self.get_record("users", user_id)?;
        Ok(user.role.can_access_module(module, action))
    }

    /// Resolve the authenticated user behind a bearer token.
    pub fn user_from_headers(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        let token = extract_bearer(headers)
            .ok_or_else(|| AuthError::Unauthorized("missing authorization header".into()))?;
        let claims = self.verify_token(token)?;
        self.get_record("users", &claims.sub)
            .map_err(|_| AuthError::Unauthorized("user not found".into()))
    }
}

/// Extract the Bearer token from an Authorization header.
pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// AccessGate implementation backed by the auth service. Injected into
/// other modules at startup.
pub struct AuthGate {
    service: Arc<AuthService>,
}

impl AuthGate {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}

impl AccessGate for AuthGate {
    fn check_module(
        &self,
        headers: &HeaderMap,
        module: &str,
        action: &str,
    ) -> Result<(), ServiceError> {
        let user = self
            .service
            .user_from_headers(headers)
            .map_err(ServiceError::from)?;
        if user.role.can_access_module(module, action) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "user '{}' may not {} in {}",
                user.username, action, module
            )))
        }
    }

    fn check_checkpoint(
        &self,
        headers: &HeaderMap,
        checkpoint_id: &str,
    ) -> Result<(), ServiceError> {
        let user = self
            .service
            .user_from_headers(headers)
            .map_err(ServiceError::from)?;
        if user.role.may_operate_checkpoint(checkpoint_id) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "user '{}' is not assigned to checkpoint {}",
                user.username, checkpoint_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreateUser, ModuleActions, PermissionMap, Role};
    use crate::service::user::tests::test_service;

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            format!("Bearer {}", token).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn operator_with_one_checkpoint_resolves_directly() {
        let svc = test_service();
        let user = svc
            .create_user(CreateUser {
                username: "rahim".into(),
                name: "Rahim".into(),
                password: "s3wing-floor".into(),
                role: Role::User {
                    assigned_checkpoints: vec!["cp-qc-1".into()],
                    permissions: PermissionMap::new(),
                },
            })
            .unwrap();

        let resolved = svc.resolve_session_checkpoint(&user.id).unwrap();
        assert_eq!(
            resolved,
            SessionCheckpoint::Station { checkpoint_id: "cp-qc-1".into() }
        );
    }

    #[test]
    fn admin_with_many_checkpoints_needs_selection() {
        let svc = test_service();
        let user = svc
            .create_user(CreateUser {
                username: "floor-admin".into(),
                name: "Floor Admin".into(),
                password: "s3wing-floor".into(),
                role: Role::Admin {
                    assigned_checkpoints: vec!["cp-1".into(), "cp-2".into()],
                    permissions: PermissionMap::new(),
                },
            })
            .unwrap();

        // No automatic resolution — only cp-1 and cp-2 are offered.
        let resolved = svc.resolve_session_checkpoint(&user.id).unwrap();
        assert_eq!(
            resolved,
            SessionCheckpoint::NeedsSelection {
                checkpoint_ids: vec!["cp-1".into(), "cp-2".into()]
            }
        );
    }

    #[test]
    fn system_admin_has_no_default_but_full_access() {
        let svc = test_service();
        let user = svc
            .create_user(CreateUser {
                username: "root".into(),
                name: "Root".into(),
                password: "super-secret".into(),
                role: Role::SystemAdmin,
            })
            .unwrap();

        let resolved = svc.resolve_session_checkpoint(&user.id).unwrap();
        assert_eq!(resolved, SessionCheckpoint::NoDefault);
        assert!(svc.can_access_module(&user.id, "production", "delete").unwrap());
    }

    #[test]
    fn gate_enforces_checkpoint_assignment() {
        let svc = test_service();
        let user = svc
            .create_user(CreateUser {
                username: "rahim".into(),
                name: "Rahim".into(),
                password: "s3wing-floor".into(),
                role: Role::User {
                    assigned_checkpoints: vec!["cp-sew-3".into()],
                    permissions: PermissionMap::new(),
                },
            })
            .unwrap();
        let tokens = svc.issue_tokens(&user).unwrap();
        let headers = bearer_headers(&tokens.access_token);

        let gate = AuthGate::new(svc.clone());
        assert!(gate.check_checkpoint(&headers, "cp-sew-3").is_ok());
        assert!(gate.check_checkpoint(&headers, "cp-qc-1").is_err());
    }

    #[test]
    fn gate_enforces_module_permissions() {
        let svc = test_service();
        let mut permissions = PermissionMap::new();
        permissions.insert(
            "production".into(),
            ModuleActions { read: true, write: false, delete: false },
        );
        let user = svc
            .create_user(CreateUser {
                username: "viewer".into(),
                name: "Viewer".into(),
                password: "s3wing-floor".into(),
                role: Role::User {
                    assigned_checkpoints: vec![],
                    permissions,
                },
            })
            .unwrap();
        let tokens = svc.issue_tokens(&user).unwrap();
        let headers = bearer_headers(&tokens.access_token);

        let gate = AuthGate::new(svc.clone());
        assert!(gate.check_module(&headers, "production", "read").is_ok());
        assert!(gate.check_module(&headers, "production", "write").is_err());

        // No token at all → unauthenticated.
        assert!(gate.check_module(&HeaderMap::new(), "production", "read").is_err());
    }
}
