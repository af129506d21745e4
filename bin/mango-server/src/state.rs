//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use mango_core::{DeleteCoordinator, SuggestionEngine};
use tokio::sync::Mutex;

use crate::backend::{BackendClient, BackendError};
use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Client for the knowledge-base backend.
    pub backend: Arc<BackendClient>,
    /// Follow-up question generator for chat answers.
    pub suggestions: Arc<SuggestionEngine>,
    /// The console-wide delete confirmation prompt.
    ///
    /// Never held across backend calls; see `routes::knowledge::deletion`.
    pub deletions: Arc<Mutex<DeleteCoordinator>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend_url)?;
        let suggestions = SuggestionEngine::from_optional_path(config.suggestions_path.as_deref());
        Ok(Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
            suggestions: Arc::new(suggestions),
            deletions: Arc::new(Mutex::new(DeleteCoordinator::new())),
        })
    }
}
