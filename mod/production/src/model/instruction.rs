use serde::{Deserialize, Serialize};

/// An operation instruction record. SMV (Standard Minute Value) is
/// descriptive only — nothing here computes with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub id: String,
    pub factory: String,
    pub operation: String,
    pub machine_type: String,
    pub smv: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating an instruction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstruction {
    pub operation: String,
    pub machine_type: String,
    pub smv: f64,
    #[serde(default)]
    pub description: Option<String>,
}
