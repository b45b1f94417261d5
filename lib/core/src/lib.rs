//! Shared kernel of the StitchLine workspace: the module seam, the
//! error taxonomy, list/pagination types, and the access-gate trait
//! business modules consult instead of depending on the auth crate.

pub mod config;
pub mod error;
pub mod gate;
pub mod module;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use gate::{AccessGate, AllowAll, DenyAll};
pub use module::Module;
pub use types::{ListQuery, Page, merge_patch, new_id, now_rfc3339};
