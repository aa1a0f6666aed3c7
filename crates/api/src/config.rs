use std::path::PathBuf;

use cardsmith_bridge::messages::DEFAULT_CARD_LIMIT;

/// Path the generation worker posts completions to, relative to the public URL.
pub const COMPLETION_CALLBACK_PATH: &str = "/api/v1/bridge/completions";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running against a local profile.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the session snapshot and the collection.
    pub profile_dir: PathBuf,
    pub database_url: String,
    /// Base URL of the external generation worker.
    pub generation_worker_url: String,
    /// Base URL the worker can reach this server on.
    pub public_url: String,
    /// Seconds before an unanswered generation fails (default: `120`).
    pub generation_timeout_secs: u64,
    /// Maximum cards requested per generation (default: `20`).
    pub card_limit: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                              |
    /// |---------------------------|--------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                            |
    /// | `PORT`                    | `3000`                               |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`              |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                 |
    /// | `PROFILE_DIR`             | `./profile`                          |
    /// | `DATABASE_URL`            | `sqlite://<PROFILE_DIR>/collection.db` |
    /// | `GENERATION_WORKER_URL`   | `http://127.0.0.1:8765`              |
    /// | `PUBLIC_URL`              | `http://127.0.0.1:<PORT>`            |
    /// | `GENERATION_TIMEOUT_SECS` | `120`                                |
    /// | `CARD_LIMIT`              | `20`                                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let profile_dir =
            PathBuf::from(std::env::var("PROFILE_DIR").unwrap_or_else(|_| "./profile".into()));

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}", profile_dir.join("collection.db").display())
        });

        let generation_worker_url = std::env::var("GENERATION_WORKER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8765".into());

        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{port}"))
            .trim_end_matches('/')
            .to_string();

        let generation_timeout_secs: u64 = std::env::var("GENERATION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("GENERATION_TIMEOUT_SECS must be a valid u64");

        let card_limit: u32 = std::env::var("CARD_LIMIT")
            .map(|v| v.parse().expect("CARD_LIMIT must be a valid u32"))
            .unwrap_or(DEFAULT_CARD_LIMIT);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            profile_dir,
            database_url,
            generation_worker_url,
            public_url,
            generation_timeout_secs,
            card_limit,
        }
    }

    /// Absolute URL the worker posts completion envelopes to.
    pub fn completion_callback_url(&self) -> String {
        format!("{}{COMPLETION_CALLBACK_PATH}", self.public_url)
    }
}
