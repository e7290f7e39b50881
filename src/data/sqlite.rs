use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::model::{
    ChatSettings, ChatSettingsUpdate, Conversation, Message, Role, User, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
use super::storage::{Storage, StorageError};

/// SQLite-backed store. Schema lives in `migrations/` and is applied on
/// connect.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn connect(db_path: &str) -> Result<Self, StorageError> {
        // The database directory may not exist on first run.
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Database(format!(
                        "failed to create database directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tracing::debug!("sqlite storage ready at {}", db_path);
        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StorageError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password) VALUES (?, ?)
             RETURNING id, username, password",
        )
        .bind(username)
        .bind(password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, username, password FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, StorageError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (title, created_at) VALUES (?, ?)
             RETURNING id, title, created_at",
        )
        .bind(title)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(conversation)
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>, StorageError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT id, title, created_at FROM conversations ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(conversations)
    }

    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, StorageError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, title, created_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(conversation)
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>, StorageError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, role, content, timestamp FROM messages
             WHERE conversation_id = ? ORDER BY timestamp, id",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn add_message(
        &self,
        conversation_id: i64,
        role: Role,
        content: &str,
    ) -> Result<Message, StorageError> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, role, content, timestamp)
             VALUES (?, ?, ?, ?)
             RETURNING id, conversation_id, role, content, timestamp",
        )
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    async fn clear_messages(&self, conversation_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_chat_settings(&self) -> Result<ChatSettings, StorageError> {
        // Single-statement get-or-create; the no-op DO UPDATE makes RETURNING
        // yield the existing row.
        let settings = sqlx::query_as::<_, ChatSettings>(
            "INSERT INTO chat_settings (id, temperature, max_tokens) VALUES (1, ?, ?)
             ON CONFLICT(id) DO UPDATE SET temperature = chat_settings.temperature
             RETURNING id, temperature, max_tokens",
        )
        .bind(DEFAULT_TEMPERATURE)
        .bind(DEFAULT_MAX_TOKENS)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn update_chat_settings(
        &self,
        update: ChatSettingsUpdate,
    ) -> Result<ChatSettings, StorageError> {
        // One upsert instead of lookup-then-write, so there is no window
        // between check and write.
        let settings = sqlx::query_as::<_, ChatSettings>(
            "INSERT INTO chat_settings (id, temperature, max_tokens)
             VALUES (1, COALESCE(?1, ?3), COALESCE(?2, ?4))
             ON CONFLICT(id) DO UPDATE SET
                 temperature = COALESCE(?1, chat_settings.temperature),
                 max_tokens = COALESCE(?2, chat_settings.max_tokens)
             RETURNING id, temperature, max_tokens",
        )
        .bind(update.temperature)
        .bind(update.max_tokens)
        .bind(DEFAULT_TEMPERATURE)
        .bind(DEFAULT_MAX_TOKENS)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}
