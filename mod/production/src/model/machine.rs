use serde::{Deserialize, Serialize};

/// Machine operating status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Running,
    Idle,
    Maintenance,
}

impl Default for MachineStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// A sewing-floor machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    pub factory: String,

    /// Asset code, unique per factory (e.g. "M-0142").
    pub code: String,

    pub name: String,
    pub machine_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_line: Option<String>,

    #[serde(default)]
    pub status: MachineStatus,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a machine.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachine {
    pub code: String,
    pub name: String,
    pub machine_type: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub production_line: Option<String>,
    #[serde(default)]
    pub status: Option<MachineStatus>,
}
