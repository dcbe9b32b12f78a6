use std::sync::Arc;

use backlog_events::EventBus;

use crate::auth::token::TokenVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: backlog_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Resolves the acting user of each request.
    pub tokens: Arc<TokenVerifier>,
    /// Event bus for post-commit domain events.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    pub fn new(pool: backlog_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let tokens = Arc::new(TokenVerifier::new(&config.auth));
        Self {
            pool,
            config: Arc::new(config),
            tokens,
            event_bus,
        }
    }
}
