//! Auth module — users, credentials, JWT sessions, and the user/role gate.
//!
//! # Resources
//!
//! - **User** — login identity with a closed role variant
//!   (User / Admin / SystemAdmin) carrying checkpoint assignments and
//!   per-module permission triples
//! - **Session** — JWT issuance record (revocable)
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let router = module.routes(); // Mount under /auth
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use stitchline_core::Module;

use crate::service::{AuthConfig, AuthService};

pub use crate::service::gate::AuthGate;

/// Auth module implementing the Module trait.
///
/// Holds the AuthService and provides HTTP routes for all auth endpoints.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule.
    pub fn new(
        sql: Arc<dyn stitchline_sql::SqlStore>,
        config: AuthConfig,
    ) -> Result<Self, stitchline_core::ServiceError> {
        let service = AuthService::new(sql, config)
            .map_err(stitchline_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
