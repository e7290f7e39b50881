pub mod memory;
pub mod model;
pub mod sqlite;
pub mod storage;

pub use memory::MemoryStorage;
pub use model::{
    ChatSettings, ChatSettingsUpdate, Conversation, Message, Role, User, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
pub use sqlite::SqliteStorage;
pub use storage::{Storage, StorageError};
