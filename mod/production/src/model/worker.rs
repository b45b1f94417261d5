use serde::{Deserialize, Serialize};

/// A production worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: String,
    pub factory: String,

    /// Employee code, unique per factory.
    pub code: String,

    pub name: String,
    pub designation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_line: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a worker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorker {
    pub code: String,
    pub name: String,
    pub designation: String,
    #[serde(default)]
    pub production_line: Option<String>,
}

fn default_true() -> bool {
    true
}
