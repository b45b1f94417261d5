use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{PromptRequest, PromptResponse};
use crate::service::AiError;

/// The prompt-completion collaborator. The concrete transport is
/// injected at startup; tests use [`StaticClient`].
#[async_trait]
pub trait PromptClient: Send + Sync {
    async fn complete(&self, request: &PromptRequest) -> Result<PromptResponse, AiError>;
}

/// HTTP client for the prompt-completion service: one JSON POST per
/// completion, optional bearer key.
pub struct HttpPromptClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpPromptClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl PromptClient for HttpPromptClient {
    async fn complete(&self, request: &PromptRequest) -> Result<PromptResponse, AiError> {
        let mut req = self.http.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AiError::Upstream(format!("completion request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AiError::Upstream(format!("completion service error: {}", e)))?;

        resp.json::<PromptResponse>()
            .await
            .map_err(|e| AiError::Upstream(format!("bad completion response: {}", e)))
    }
}

/// Test client returning canned fields for every declared output field.
pub struct StaticClient {
    pub canned: HashMap<String, String>,
}

#[async_trait]
impl PromptClient for StaticClient {
    async fn complete(&self, request: &PromptRequest) -> Result<PromptResponse, AiError> {
        let mut fields = HashMap::new();
        for field in &request.output_fields {
            let value = self
                .canned
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| format!("canned {}", field.name));
            fields.insert(field.name.clone(), value);
        }
        Ok(PromptResponse { fields })
    }
}
