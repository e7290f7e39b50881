use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String, // Note: stored plain-text, matching the original schema. Never exposed by a route.
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Shared defaults applied when a completion request omits parameters.
/// Temperature is a decimal string, the way the original schema stored it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    pub id: i64,
    pub temperature: String,
    pub max_tokens: i64,
}

pub const DEFAULT_TEMPERATURE: &str = "0.7";
pub const DEFAULT_MAX_TOKENS: i64 = 512;

/// Partial update for the settings singleton; absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettingsUpdate {
    pub temperature: Option<String>,
    pub max_tokens: Option<i64>,
}
