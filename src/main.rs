use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vllm_chat::ai::InferenceClient;
use vllm_chat::config::Config;
use vllm_chat::data::{MemoryStorage, SqliteStorage, Storage};
use vllm_chat::router::api_router;
use vllm_chat::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vllm_chat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();
    let config = Config::from_env();

    let storage: Arc<dyn Storage> = match &config.database_path {
        Some(path) => {
            let store = SqliteStorage::connect(path).await.unwrap_or_else(|e| {
                eprintln!("Failed to open database: {}", e);
                std::process::exit(1);
            });
            tracing::info!("using sqlite storage at {}", path);
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_PATH not set, using in-memory storage");
            Arc::new(MemoryStorage::new())
        }
    };

    let inference = InferenceClient::new(&config.inference_host);
    tracing::info!("proxying to inference server at {}", inference.endpoint());

    let state = AppState::new(storage, inference);

    let app = api_router(state)
        .fallback_service(ServeDir::new("assets"))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::debug!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap_or_else(|e| {
        eprintln!("Failed to bind {}: {}", addr, e);
        std::process::exit(1);
    });
    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
