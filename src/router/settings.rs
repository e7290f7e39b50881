use axum::extract::State;
use axum::Json;

use crate::data::{ChatSettings, ChatSettingsUpdate};
use crate::error::ApiError;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<ChatSettings>, ApiError> {
    Ok(Json(state.storage.get_chat_settings().await?))
}

#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<ChatSettingsUpdate>,
) -> Result<Json<ChatSettings>, ApiError> {
    Ok(Json(state.storage.update_chat_settings(update).await?))
}
