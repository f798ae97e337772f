//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use neurovox_core::TtsService;

use crate::config::ServerConfig;

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one synthesis service of this process
    pub service: Arc<TtsService>,
    /// Effective configuration
    pub config: Arc<ServerConfig>,
    /// When the service finished loading
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    #[must_use]
    pub fn new(service: TtsService, config: ServerConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }
}
