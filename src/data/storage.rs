use async_trait::async_trait;
use thiserror::Error;

use super::model::{ChatSettings, ChatSettingsUpdate, Conversation, Message, Role, User};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("username is already taken")]
    Conflict,
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return StorageError::Conflict;
            }
        }
        StorageError::Database(err.to_string())
    }
}

/// One storage contract, two backends: an in-memory map store and a SQLite
/// file store. The backend is picked once at startup.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StorageError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    async fn create_conversation(&self, title: &str) -> Result<Conversation, StorageError>;
    /// All conversations, ascending by creation time.
    async fn get_conversations(&self) -> Result<Vec<Conversation>, StorageError>;
    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, StorageError>;
    /// Removes the conversation and all of its messages. Not an error if the
    /// conversation never existed.
    async fn delete_conversation(&self, id: i64) -> Result<(), StorageError>;

    /// Messages of one conversation, ascending by timestamp.
    async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>, StorageError>;
    /// Assigns id and timestamp server-side. Does not check that the
    /// conversation exists.
    async fn add_message(
        &self,
        conversation_id: i64,
        role: Role,
        content: &str,
    ) -> Result<Message, StorageError>;
    async fn clear_messages(&self, conversation_id: i64) -> Result<(), StorageError>;

    /// Returns the settings singleton, creating the default record on first
    /// access.
    async fn get_chat_settings(&self) -> Result<ChatSettings, StorageError>;
    /// Merges the given fields onto the singleton, creating it if absent.
    async fn update_chat_settings(
        &self,
        update: ChatSettingsUpdate,
    ) -> Result<ChatSettings, StorageError>;
}
