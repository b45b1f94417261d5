use serde::{Deserialize, Serialize};

/// Status label of a code that has never passed a checkpoint.
///
/// Every other status value is the name of the last checkpoint passed —
/// status is "the most recent checkpoint name", not a position in a flow
/// graph.
pub const STATUS_UNASSIGNED: &str = "Unassigned";

/// A QR code identifying one physical production bundle.
/// PK = id (the scanned token — plain text, no internal structure).
///
/// Codes are generated in bulk as blank stock, later assigned to a work
/// order, and from then on advanced by checkpoint passes. They are never
/// deleted (retained for audit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    /// Unique scannable token, e.g. `QRMB3K2V1XH29-4F7A`.
    pub id: String,

    /// Owning factory.
    pub factory: String,

    /// Work order this bundle belongs to (`WorkOrder.workOrderNo`).
    /// Absent means unassigned blank stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<String>,

    /// Name of the last checkpoint passed, or [`STATUS_UNASSIGNED`].
    pub status: String,

    /// Garment size, fixed at assignment time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Number of pieces in the bundle, fixed at assignment time.
    #[serde(default)]
    pub bundle_qty: u32,

    /// Sequential bundle number within the work order, fixed at
    /// assignment time.
    #[serde(default)]
    pub bundle_no: u32,

    pub created_at: String,
    pub updated_at: String,
}

impl QrCode {
    /// Whether this code has been assigned to a work order.
    pub fn is_assigned(&self) -> bool {
        self.work_order_id.is_some()
    }
}
