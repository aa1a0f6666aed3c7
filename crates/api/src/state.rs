use std::sync::Arc;
use std::time::Duration;

use cardsmith_bridge::{BridgeAdapter, BridgeConfig, GenerationConstraints, Transport};
use cardsmith_core::store::SessionStore;
use cardsmith_db::SqliteCollection;
use cardsmith_pipeline::{ImportCoordinator, WorkflowController};
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Note collection connection pool.
    pub pool: cardsmith_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// The single workflow; handlers serialize on its lock.
    pub workflow: Arc<Mutex<WorkflowController>>,
    /// Receives out-of-band generation completions.
    pub bridge: BridgeAdapter,
    /// Session snapshot store behind the session RPCs.
    pub sessions: Arc<dyn SessionStore>,
    pub importer: Arc<ImportCoordinator>,
}

impl AppState {
    /// Wire the workflow over `pool`, `transport` and `sessions`.
    ///
    /// Spawns the session writer task, so this must run inside a tokio
    /// runtime.
    pub fn new(
        pool: cardsmith_db::DbPool,
        config: ServerConfig,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let bridge = BridgeAdapter::new(
            transport,
            BridgeConfig {
                timeout: Duration::from_secs(config.generation_timeout_secs),
            },
        );
        let importer = Arc::new(ImportCoordinator::new(Arc::new(SqliteCollection::new(
            pool.clone(),
        ))));
        let constraints = GenerationConstraints {
            card_limit: config.card_limit,
            preferred_card_type: None,
        };
        let controller =
            WorkflowController::new(bridge.clone(), Arc::clone(&importer), Arc::clone(&sessions))
                .with_constraints(constraints);

        Self {
            pool,
            config: Arc::new(config),
            workflow: Arc::new(Mutex::new(controller)),
            bridge,
            sessions,
            importer,
        }
    }
}
