//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::Database;
use crate::service::ServiceContainer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    pub db: Database,
}

impl AppState {
    pub fn new(services: Arc<dyn ServiceContainer>, db: Database) -> Self {
        Self { services, db }
    }
}
