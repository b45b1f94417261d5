use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use stitchline_kv::KvStore;

use crate::client::PromptClient;
use crate::model::{PromptField, PromptRequest, PromptResponse};

/// AI tools error type.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("validation: {0}")]
    Validation(String),

    /// The completion service is unreachable or answered garbage.
    #[error("upstream: {0}")]
    Upstream(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AiError> for stitchline_core::ServiceError {
    fn from(e: AiError) -> Self {
        use stitchline_core::ServiceError;
        match e {
            AiError::Validation(m) => ServiceError::Validation(m),
            AiError::Upstream(m) => ServiceError::Dependency(m),
            AiError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Built-in prompt templates, overridable per deployment via the KV file
/// layer (`ai/{tool}.yaml` → `config:ai:{tool}`).
const OPTIMIZE_SCHEDULE_TEMPLATE: &str = "\
You plan garment production schedules. Given the work orders with their \
quantities, delivery dates and assigned lines, propose a day-by-day \
line schedule that meets every delivery date, and note any order that \
cannot be met.";

const PREDICT_BOTTLENECKS_TEMPLATE: &str = "\
You analyze garment production flow. Given per-checkpoint bundle \
tallies and the open work orders, identify the checkpoints where work \
is piling up, explain the likely cause, and recommend rebalancing \
steps.";

#[derive(Debug, Deserialize)]
struct ToolTemplate {
    template: String,
}

/// The AI tools service — stateless pass-through over the injected
/// prompt client.
pub struct AiService {
    client: Arc<dyn PromptClient>,
    kv: Arc<dyn KvStore>,
}

impl AiService {
    pub fn new(client: Arc<dyn PromptClient>, kv: Arc<dyn KvStore>) -> Self {
        Self { client, kv }
    }

    /// Propose an optimized line schedule for the given work orders.
    pub async fn optimize_schedule(
        &self,
        data: serde_json::Value,
    ) -> Result<PromptResponse, AiError> {
        let request = PromptRequest {
            prompt: self.template("optimize_schedule", OPTIMIZE_SCHEDULE_TEMPLATE),
            input_fields: vec![
                PromptField::new("workOrders", "open work orders with quantities and dates"),
                PromptField::new("productionLines", "available lines and their daily capacity"),
            ],
            output_fields: vec![
                PromptField::new("schedule", "day-by-day plan per production line"),
                PromptField::new("risks", "orders at risk of missing their delivery date"),
            ],
            data: require_object(data)?,
        };
        self.client.complete(&request).await
    }

    /// Predict where bundles will pile up next.
    pub async fn predict_bottlenecks(
        &self,
        data: serde_json::Value,
    ) -> Result<PromptResponse, AiError> {
        let request = PromptRequest {
            prompt: self.template("predict_bottlenecks", PREDICT_BOTTLENECKS_TEMPLATE),
            input_fields: vec![
                PromptField::new("checkpointTallies", "bundle counts per checkpoint status"),
                PromptField::new("workOrders", "open work orders with target outputs"),
            ],
            output_fields: vec![
                PromptField::new("bottlenecks", "checkpoints where work is accumulating"),
                PromptField::new("recommendations", "suggested rebalancing steps"),
            ],
            data: require_object(data)?,
        };
        self.client.complete(&request).await
    }

    /// Deployment template override, else the built-in default.
    fn template(&self, tool: &str, default: &str) -> String {
        let key = format!("config:ai:{}", tool);
        match self.kv.get(&key) {
            Ok(Some(bytes)) => match serde_yaml::from_slice::<ToolTemplate>(&bytes) {
                Ok(t) => t.template,
                Err(e) => {
                    warn!(tool, "ignoring malformed prompt template: {}", e);
                    default.to_string()
                }
            },
            _ => default.to_string(),
        }
    }
}

fn require_object(data: serde_json::Value) -> Result<serde_json::Value, AiError> {
    if data.is_object() {
        Ok(data)
    } else {
        Err(AiError::Validation("request data must be a JSON object".into()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use stitchline_kv::{OverlayStore, RedbStore};

    use super::*;
    use crate::client::StaticClient;

    fn service_with(
        canned: HashMap<String, String>,
    ) -> (AiService, Arc<OverlayStore<RedbStore>>, tempfile::NamedTempFile) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let kv = Arc::new(OverlayStore::new(RedbStore::open(tmp.path()).unwrap()));
        let svc = AiService::new(Arc::new(StaticClient { canned }), kv.clone());
        (svc, kv, tmp)
    }

    #[tokio::test]
    async fn optimize_schedule_passes_through_output_fields() {
        let canned: HashMap<String, String> =
            [("schedule".to_string(), "Line-3: WO-01 Mon..Thu".to_string())]
                .into_iter()
                .collect();
        let (svc, _kv, _tmp) = service_with(canned);

        let result = svc
            .optimize_schedule(serde_json::json!({"workOrders": []}))
            .await
            .unwrap();
        assert_eq!(
            result.fields.get("schedule").map(String::as_str),
            Some("Line-3: WO-01 Mon..Thu")
        );
        // Every declared output field comes back.
        assert!(result.fields.contains_key("risks"));
    }

    #[tokio::test]
    async fn data_must_be_an_object() {
        let (svc, _kv, _tmp) = service_with(HashMap::new());
        assert!(matches!(
            svc.predict_bottlenecks(serde_json::json!([1, 2, 3])).await,
            Err(AiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn template_override_from_kv() {
        let (svc, kv, _tmp) = service_with(HashMap::new());
        kv.seed(
            "config:ai:optimize_schedule".into(),
            b"template: custom planner prompt\n".to_vec(),
        );
        assert_eq!(
            svc.template("optimize_schedule", OPTIMIZE_SCHEDULE_TEMPLATE),
            "custom planner prompt"
        );
        assert_eq!(
            svc.template("predict_bottlenecks", PREDICT_BOTTLENECKS_TEMPLATE),
            PREDICT_BOTTLENECKS_TEMPLATE
        );
    }
}
