//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::ValidationSettings;
use crate::db::repository::PersonRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn PersonRepository>,
    /// Rules applied to create/update payloads
    pub validation: Arc<ValidationSettings>,
}

impl AppState {
    /// Create application state with default validation rules.
    pub fn new(repository: Arc<dyn PersonRepository>) -> Self {
        Self::with_validation(repository, ValidationSettings::default())
    }

    pub fn with_validation(
        repository: Arc<dyn PersonRepository>,
        validation: ValidationSettings,
    ) -> Self {
        Self {
            repository,
            validation: Arc::new(validation),
        }
    }
}
