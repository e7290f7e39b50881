use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

/// Models the start endpoint accepts.
pub const ALLOWED_MODELS: [&str; 3] = [
    "bigscience/bloom-1b1",
    "bigscience/bloom-3b",
    "bigscience/bloomz-7b1",
];

/// Model id sent upstream when no start request has been issued yet.
pub const DEFAULT_MODEL: &str = "bigscience/bloomz-7b1";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid model specified")]
    UnknownModel,
    #[error("No model is currently running")]
    NotRunning,
}

/// Response of a start request: the vLLM launch command the user runs in
/// their own terminal. This service never spawns the process itself, so
/// `running` stays false and stop always fails.
#[derive(Debug, Serialize)]
pub struct StartPlan {
    pub message: String,
    pub command: String,
    pub model: String,
    pub instructions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RunStatus {
    pub running: bool,
    pub model: Option<String>,
    pub pid: Option<u32>,
}

/// Tracks which model the user asked to launch. Held in [`crate::AppState`]
/// rather than module globals so it can be constructed per test.
#[derive(Debug, Default)]
pub struct ModelRunner {
    requested: Mutex<Option<String>>,
}

impl ModelRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, model: &str) -> Result<StartPlan, RunnerError> {
        if !ALLOWED_MODELS.contains(&model) {
            return Err(RunnerError::UnknownModel);
        }

        let command = format!(
            "python3 -m vllm.entrypoints.openai.api_server --model {} --host 0.0.0.0 --port 8000",
            model
        );

        *self.requested.lock().unwrap_or_else(|e| e.into_inner()) = Some(model.to_string());
        tracing::info!("generated launch command for {}", model);

        Ok(StartPlan {
            message: format!("To start {}, run this command in your WSL terminal:", model),
            command,
            model: model.to_string(),
            instructions: vec![
                "1. Open your WSL terminal".to_string(),
                "2. Copy and run the command above".to_string(),
                "3. Wait for the model to load".to_string(),
                "4. The interface will automatically detect when it's ready".to_string(),
            ],
        })
    }

    /// There is never a tracked process under the command-only design, so
    /// stop is always a client error.
    pub fn stop(&self) -> Result<(), RunnerError> {
        Err(RunnerError::NotRunning)
    }

    pub fn status(&self) -> RunStatus {
        RunStatus {
            running: false,
            model: self.requested_model(),
            pid: None,
        }
    }

    /// The model name the chat proxy should send upstream, if any was
    /// requested.
    pub fn requested_model(&self) -> Option<String> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
