//! Full-text search for the master-data list screens: the
//! [`SearchEngine`] trait and its tantivy implementation, one index
//! per entity collection.

pub mod error;
pub mod tantivy;
pub mod traits;

pub use error::SearchError;
pub use tantivy::TantivyEngine;
pub use traits::{Hit, SearchEngine};
