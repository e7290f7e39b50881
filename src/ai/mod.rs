pub mod client;
pub mod completion;

pub use client::{InferenceClient, InferenceError, Model};
pub use completion::{ChatCompletionRequest, ChatMessage};
