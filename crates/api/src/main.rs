use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardsmith_api::config::ServerConfig;
use cardsmith_api::router::build_app_router;
use cardsmith_api::state::AppState;
use cardsmith_bridge::HttpTransport;
use cardsmith_db::SessionFileStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardsmith_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, profile = %config.profile_dir.display(), "Loaded server configuration");

    tokio::fs::create_dir_all(&config.profile_dir)
        .await
        .expect("Failed to create profile directory");

    // --- Collection ---
    let pool = cardsmith_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open collection database");
    tracing::info!("Collection connection pool created");

    cardsmith_db::health_check(&pool)
        .await
        .expect("Collection health check failed");

    cardsmith_db::run_migrations(&pool)
        .await
        .expect("Failed to run collection migrations");
    tracing::info!("Collection migrations applied");

    // --- Generation bridge ---
    let transport = HttpTransport::new(
        config.generation_worker_url.clone(),
        config.completion_callback_url(),
    );
    tracing::info!(
        worker = %config.generation_worker_url,
        callback = %config.completion_callback_url(),
        timeout_secs = config.generation_timeout_secs,
        "Generation worker configured",
    );

    // --- App state ---
    let sessions = Arc::new(SessionFileStore::in_profile(&config.profile_dir));
    let state = AppState::new(pool, config.clone(), Arc::new(transport), sessions);

    // --- Resume ---
    match state.workflow.lock().await.resume().await {
        Ok(true) => tracing::info!("Resumed saved session"),
        Ok(false) => tracing::info!("No saved session to resume"),
        Err(e) => tracing::warn!(error = %e, "Could not resume saved session"),
    }

    // --- Router ---
    let app = build_app_router(state.clone(), &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, flushing session");
    state.workflow.lock().await.flush_saves().await;
    state.pool.close().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
