//! Production module — master data, QR bundle tracking, QC checklists,
//! and the factory dashboard.
//!
//! # Resources
//!
//! - **Machine / Worker / Instruction** — master-data CRUD with search
//! - **WorkOrder** — planned production runs, keyed by `workOrderNo`
//! - **CheckPoint** — scanning stations (entry/exit flagged)
//! - **QrCode** — bundle identifiers: generated blank, assigned to a
//!   work order, advanced by checkpoint passes
//! - **BundleHistoryRecord** — append-only passage log
//! - **QcReport** — append-only QC checklist submissions
//!
//! Services are constructed one-per-factory and resolved from the URL
//! path; there is no shared mutable state between factories.

pub mod api;
pub mod model;
pub mod service;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;

use stitchline_core::{AccessGate, Module};

use crate::service::{ProductionError, ProductionService};

/// Factory id → service instance. Built once at startup from the
/// configured factory list.
pub struct FactoryRegistry {
    services: HashMap<String, Arc<ProductionService>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self { services: HashMap::new() }
    }

    /// Register a factory's service. Replaces any previous instance for
    /// the same factory id.
    pub fn insert(&mut self, service: ProductionService) {
        self.services
            .insert(service.factory().to_string(), Arc::new(service));
    }

    /// Resolve a factory id to its service.
    pub fn get(&self, factory: &str) -> Result<Arc<ProductionService>, ProductionError> {
        self.services
            .get(factory)
            .cloned()
            .ok_or_else(|| ProductionError::NotFound(format!("factory '{}'", factory)))
    }

    /// All registered factory ids, sorted.
    pub fn factory_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.services.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Production module implementing the Module trait.
pub struct ProductionModule {
    factories: Arc<FactoryRegistry>,
    gate: Arc<dyn AccessGate>,
}

impl ProductionModule {
    pub fn new(factories: FactoryRegistry, gate: Arc<dyn AccessGate>) -> Self {
        Self {
            factories: Arc::new(factories),
            gate,
        }
    }

    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.factories
    }
}

impl Module for ProductionModule {
    fn name(&self) -> &str {
        "production"
    }

    fn routes(&self) -> Router {
        api::router(api::AppState {
            factories: self.factories.clone(),
            gate: self.gate.clone(),
        })
    }
}
