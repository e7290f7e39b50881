/// Environment-driven configuration. `dotenv` is loaded by `main` before
/// this is read.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the API listens on.
    pub port: u16,
    /// Host of the vLLM server; the serving port is fixed at 8000.
    pub inference_host: String,
    /// SQLite file path. Absent selects the in-memory backend.
    pub database_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            inference_host: std::env::var("VLLM_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            database_path: std::env::var("DATABASE_PATH").ok(),
        }
    }
}
