use axum::routing::{delete, get, post};
use axum::Router;

use crate::AppState;

mod chat;
use chat::{chat_completions, chat_status};
mod conversations;
use conversations::{
    add_message, clear_messages, create_conversation, delete_conversation, get_messages,
    list_conversations,
};
mod models;
use models::{model_status, start_model, stop_model};
mod settings;
use settings::{get_settings, update_settings};

pub fn api_router(state: AppState) -> Router {
    let models_router = Router::new()
        .route("/start", post(start_model))
        .route("/stop", post(stop_model))
        .route("/status", get(model_status));

    let chat_router = Router::new()
        .route("/completions", post(chat_completions))
        .route("/status", get(chat_status))
        .route("/settings", get(get_settings).put(update_settings));

    let conversations_router = Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route("/{id}", delete(delete_conversation))
        .route(
            "/{id}/messages",
            get(get_messages).post(add_message).delete(clear_messages),
        );

    Router::new()
        .nest("/api/models", models_router)
        .nest("/api/chat", chat_router)
        .nest("/api/conversations", conversations_router)
        .with_state(state)
}
