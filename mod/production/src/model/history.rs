use serde::{Deserialize, Serialize};

/// Status recorded on every successful checkpoint pass.
pub const STATUS_PASSED: &str = "Passed";

/// One recorded checkpoint passage. Append-only: rows are written by
/// `confirm_pass` and never updated or deleted. `seq` is assigned by the
/// store and orders rows chronologically per code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleHistoryRecord {
    pub seq: i64,
    pub factory: String,
    pub qr_code_id: String,
    pub work_order_id: String,
    pub check_point_name: String,
    /// Always [`STATUS_PASSED`] in current scope.
    pub status: String,
    pub recorded_at: String,
}
