//! AI tools module — two text-generation helpers wrapping an external
//! prompt-completion service: schedule optimization and bottleneck
//! prediction. Pure pass-through: a structured prompt with declared
//! input/output fields goes out, the service's structured text result
//! comes back verbatim. No state is kept here.

pub mod api;
pub mod client;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use stitchline_core::Module;

use crate::service::AiService;

pub use crate::client::{HttpPromptClient, PromptClient};

/// AI tools module implementing the Module trait.
pub struct AiModule {
    service: Arc<AiService>,
}

impl AiModule {
    pub fn new(service: AiService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for AiModule {
    fn name(&self) -> &str {
        "aitools"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
