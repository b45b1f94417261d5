use serde::{Deserialize, Serialize};

use crate::model::QrCode;

/// Tri-state outcome of one QC checklist line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QcOutcome {
    Unset,
    Passed,
    Failed,
}

impl Default for QcOutcome {
    fn default() -> Self {
        Self::Unset
    }
}

/// A materialized checklist line item — one per piece in the bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcChecklistItem {
    /// 1-based piece number.
    pub seq: u32,
    pub outcome: QcOutcome,
}

/// The checklist materialized for an eligible bundle: exactly
/// `bundleQty` items, all starting unset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcChecklist {
    pub qr_code: QrCode,
    pub items: Vec<QcChecklistItem>,
}

/// One submitted checklist item. `passed` and `failed` are mutually
/// exclusive — both set is rejected at validation; the UI clears one when
/// the other is selected. A failed item requires a reason from the
/// factory's configured reason list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcItemResult {
    pub seq: u32,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A failed item and its reason, as recorded on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcFailure {
    pub seq: u32,
    pub reason: String,
}

/// Append-only record of one QC checklist submission. Submitting a
/// report never advances the bundle's status — reporting and
/// checkpoint-passing are independently triggered operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcReport {
    pub id: String,
    pub factory: String,
    pub qr_code_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<String>,
    pub passed: u32,
    pub failed: u32,
    pub unset: u32,
    #[serde(default)]
    pub failures: Vec<QcFailure>,
    pub recorded_at: String,
}
