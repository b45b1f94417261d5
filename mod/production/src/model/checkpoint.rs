use serde::{Deserialize, Serialize};

/// A configured scanning station. The `name` is unique within a factory —
/// it is the status value stored on a QR code after a pass, so renaming a
/// checkpoint changes what future passes record, never what history holds.
///
/// Entry/exit flags are independent: a checkpoint may be both, neither,
/// or either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPoint {
    pub id: String,
    pub factory: String,

    /// Display name and status label, e.g. "Sewing In", "Finish Sewing QC".
    pub name: String,

    /// Category: Cutting, Sewing, QC, Finishing, ...
    pub cp_type: String,

    /// Bundles enter production through checkpoints with this flag.
    #[serde(default)]
    pub is_production_entry: bool,

    /// Bundles leave production through checkpoints with this flag.
    #[serde(default)]
    pub is_production_exit: bool,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a checkpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckPoint {
    pub name: String,
    pub cp_type: String,
    #[serde(default)]
    pub is_production_entry: bool,
    #[serde(default)]
    pub is_production_exit: bool,
}
