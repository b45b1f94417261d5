use std::collections::HashMap;

use crate::error::SearchError;

/// One full-text match: the document id, its relevance score, and the
/// stored fields it was indexed with.
#[derive(Debug, Clone)]
pub struct Hit {
    pub id: String,
    pub score: f32,
    pub fields: HashMap<String, String>,
}

/// Full-text search over per-collection document indexes.
///
/// Collections are named after the entity they hold ("machines",
/// "workers", "workorders"); a document is an id plus flat string
/// fields. Backs the search box on every master-data list screen.
pub trait SearchEngine: Send + Sync {
    /// Index (or replace, by id) one document.
    fn index(&self, collection: &str, id: &str, doc: HashMap<String, String>)
    -> Result<(), SearchError>;

    /// Drop a document from a collection.
    fn delete(&self, collection: &str, id: &str) -> Result<(), SearchError>;

    /// Top `limit` matches for `query`, best first.
    fn search(&self, collection: &str, query: &str, limit: usize)
    -> Result<Vec<Hit>, SearchError>;
}
