use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A planned production run. Bundles (QR codes) belong to exactly one
/// work order via `QrCode.workOrderId` = `workOrderNo`.
///
/// Work orders are created by production planning; the bundle lifecycle
/// engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: String,
    pub factory: String,

    /// Business key, unique per factory (e.g. "WO-2025-0173").
    pub work_order_no: String,

    pub style_no: String,
    pub garment_type: String,
    pub production_line: String,

    /// Size → ordered quantity.
    #[serde(default)]
    pub size_breakdown: HashMap<String, u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,

    /// Planned output per day.
    #[serde(default)]
    pub target_output: u32,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a work order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkOrder {
    pub work_order_no: String,
    pub style_no: String,
    pub garment_type: String,
    pub production_line: String,
    #[serde(default)]
    pub size_breakdown: HashMap<String, u32>,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub target_output: u32,
}
