use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One entry of the upstream `/v1/models` listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct ModelList {
    object: String,
    data: Vec<Model>,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference server error: {status}")]
    Status { status: reqwest::StatusCode },
    #[error("cannot reach inference server: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the local OpenAI-compatible inference server. Every call is a
/// fresh request; nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl InferenceClient {
    /// Points at `http://{host}:8000`, the fixed vLLM serving port.
    pub fn new(host: &str) -> Self {
        Self::with_base_url(format!("http://{}:8000", host))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// Connectivity probe against the model-listing API.
    pub async fn list_models(&self) -> Result<Vec<Model>, InferenceError> {
        let response = self
            .http
            .get(format!("{}/v1/models", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InferenceError::Status {
                status: response.status(),
            });
        }

        let list: ModelList = response.json().await?;
        Ok(list.data)
    }

    /// Forwards one non-streaming chat completion and hands the upstream
    /// body back unmodified.
    pub async fn chat_completions(&self, body: &Value) -> Result<Value, InferenceError> {
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("upstream completion failed with status {}", status);
            return Err(InferenceError::Status { status });
        }

        Ok(response.json().await?)
    }
}
