//! Application state shared across handlers.

use crate::auth::AuthService;
use crate::config::Config;
use crate::db::Database;
use crate::uploads::UploadStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Database connection.
    pub db: Database,
    /// Authentication service.
    pub auth: Arc<AuthService>,
    /// Cover upload store.
    pub uploads: UploadStore,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: Config, db: Database, auth: AuthService, uploads: UploadStore) -> Self {
        Self {
            config: Arc::new(config),
            db,
            auth: Arc::new(auth),
            uploads,
        }
    }
}
