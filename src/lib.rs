use std::sync::Arc;

pub mod ai;
pub mod config;
pub mod data;
pub mod error;
pub mod router;
pub mod runner;

use ai::InferenceClient;
use data::Storage;
use runner::ModelRunner;

/// Shared handles injected into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub inference: InferenceClient,
    pub runner: Arc<ModelRunner>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, inference: InferenceClient) -> Self {
        Self {
            storage,
            inference,
            runner: Arc::new(ModelRunner::new()),
        }
    }
}
