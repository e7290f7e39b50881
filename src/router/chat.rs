use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::ai::ChatCompletionRequest;
use crate::error::ApiError;
use crate::runner::DEFAULT_MODEL;
use crate::AppState;

/// Validates, merges stored defaults, and forwards one non-streaming
/// completion to the inference server. The upstream body passes through
/// unmodified.
#[axum::debug_handler]
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    let settings = state.storage.get_chat_settings().await?;
    let (temperature, max_tokens) = request.resolve(&settings);
    let model = state
        .runner
        .requested_model()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let body = json!({
        "model": model,
        "messages": request.messages,
        "temperature": temperature,
        "max_tokens": max_tokens,
        "stream": false,
    });

    let completion = state
        .inference
        .chat_completions(&body)
        .await
        .map_err(|e| ApiError::Upstream {
            message: "Failed to get chat completion".to_string(),
            details: e.to_string(),
        })?;

    Ok(Json(completion))
}

/// Fresh connectivity probe per call; 503 with the failure detail when the
/// inference server is unreachable.
#[axum::debug_handler]
pub async fn chat_status(State(state): State<AppState>) -> Response {
    match state.inference.list_models().await {
        Ok(models) => Json(json!({
            "connected": true,
            "models": models,
            "server": "VLLM",
            "endpoint": state.inference.endpoint(),
        }))
        .into_response(),
        Err(err) => {
            tracing::debug!("inference server probe failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "connected": false,
                    "error": "Cannot connect to VLLM server",
                    "details": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}
