use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::runner::{RunStatus, StartPlan};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StartModelRequest {
    pub model: String,
}

#[axum::debug_handler]
pub async fn start_model(
    State(state): State<AppState>,
    Json(request): Json<StartModelRequest>,
) -> Result<Json<StartPlan>, ApiError> {
    let plan = state.runner.start(&request.model)?;
    Ok(Json(plan))
}

#[axum::debug_handler]
pub async fn stop_model(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.runner.stop()?;
    Ok(Json(json!({ "message": "Model stopped" })))
}

#[axum::debug_handler]
pub async fn model_status(State(state): State<AppState>) -> Json<RunStatus> {
    Json(state.runner.status())
}
