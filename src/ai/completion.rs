use serde::{Deserialize, Serialize};

use crate::data::{ChatSettings, Role, DEFAULT_MAX_TOKENS};

/// Body of `POST /api/chat/completions`. Checked before any upstream call is
/// made.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatCompletionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.messages.is_empty() {
            return Err("messages must not be empty".to_string());
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("temperature must be between 0 and 2".to_string());
            }
        }
        if let Some(max_tokens) = self.max_tokens {
            if !(1..=4096).contains(&max_tokens) {
                return Err("maxTokens must be between 1 and 4096".to_string());
            }
        }
        Ok(())
    }

    /// Effective parameters: request value, then stored settings, then the
    /// hardcoded defaults.
    pub fn resolve(&self, settings: &ChatSettings) -> (f64, i64) {
        let fallback_temperature = settings.temperature.parse::<f64>().unwrap_or(0.7);
        let temperature = self.temperature.unwrap_or(fallback_temperature);
        let max_tokens = self.max_tokens.unwrap_or(if settings.max_tokens > 0 {
            settings.max_tokens
        } else {
            DEFAULT_MAX_TOKENS
        });
        (temperature, max_tokens)
    }
}
