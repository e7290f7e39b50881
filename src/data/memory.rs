use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::model::{
    ChatSettings, ChatSettingsUpdate, Conversation, Message, Role, User, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
use super::storage::{Storage, StorageError};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    conversations: BTreeMap<i64, Conversation>,
    messages: BTreeMap<i64, Message>,
    settings: Option<ChatSettings>,
    next_user_id: i64,
    next_conversation_id: i64,
    next_message_id: i64,
}

/// Map-backed store for single-user setups that do not need a database file.
/// All state is process-lifetime only.
#[derive(Debug)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let inner = Inner {
            settings: Some(ChatSettings {
                id: 1,
                temperature: DEFAULT_TEMPERATURE.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
            }),
            next_user_id: 1,
            next_conversation_id: 1,
            next_message_id: 1,
            ..Inner::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only happens after a panic in another request; the
        // data itself is still a consistent map.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StorageError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.username == username) {
            return Err(StorageError::Conflict);
        }
        let id = inner.next_user_id;
        inner.next_user_id += 1;
        let user = User {
            id,
            username: username.to_string(),
            password: password.to_string(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, StorageError> {
        let mut inner = self.lock();
        let id = inner.next_conversation_id;
        inner.next_conversation_id += 1;
        let conversation = Conversation {
            id,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        inner.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>, StorageError> {
        let inner = self.lock();
        let mut conversations: Vec<_> = inner.conversations.values().cloned().collect();
        conversations.sort_by_key(|c| (c.created_at, c.id));
        Ok(conversations)
    }

    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, StorageError> {
        Ok(self.lock().conversations.get(&id).cloned())
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.conversations.remove(&id);
        inner.messages.retain(|_, m| m.conversation_id != id);
        Ok(())
    }

    async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>, StorageError> {
        let inner = self.lock();
        let mut messages: Vec<_> = inner
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.timestamp, m.id));
        Ok(messages)
    }

    async fn add_message(
        &self,
        conversation_id: i64,
        role: Role,
        content: &str,
    ) -> Result<Message, StorageError> {
        let mut inner = self.lock();
        let id = inner.next_message_id;
        inner.next_message_id += 1;
        let message = Message {
            id,
            conversation_id,
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        inner.messages.insert(id, message.clone());
        Ok(message)
    }

    async fn clear_messages(&self, conversation_id: i64) -> Result<(), StorageError> {
        self.lock()
            .messages
            .retain(|_, m| m.conversation_id != conversation_id);
        Ok(())
    }

    async fn get_chat_settings(&self) -> Result<ChatSettings, StorageError> {
        let mut inner = self.lock();
        Ok(inner
            .settings
            .get_or_insert_with(|| ChatSettings {
                id: 1,
                temperature: DEFAULT_TEMPERATURE.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
            })
            .clone())
    }

    async fn update_chat_settings(
        &self,
        update: ChatSettingsUpdate,
    ) -> Result<ChatSettings, StorageError> {
        let mut inner = self.lock();
        let settings = inner.settings.get_or_insert_with(|| ChatSettings {
            id: 1,
            temperature: DEFAULT_TEMPERATURE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        });
        if let Some(temperature) = update.temperature {
            settings.temperature = temperature;
        }
        if let Some(max_tokens) = update.max_tokens {
            settings.max_tokens = max_tokens;
        }
        Ok(settings.clone())
    }
}
