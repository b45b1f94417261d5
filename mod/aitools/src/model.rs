use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One declared field in a prompt schema — name plus a short
/// description the completion service uses to shape its answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptField {
    pub name: String,
    pub description: String,
}

impl PromptField {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// A structured prompt: instruction text, the declared input/output
/// field schemas, and the caller's input data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub prompt: String,
    pub input_fields: Vec<PromptField>,
    pub output_fields: Vec<PromptField>,
    pub data: serde_json::Value,
}

/// The structured text result: one string per declared output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub fields: HashMap<String, String>,
}
