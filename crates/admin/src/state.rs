//! Application state shared across admin handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::StorageService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    storage: StorageService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds the object storage client from the storage config; this loads
    /// the AWS SDK runtime pieces and is therefore async.
    pub async fn new(config: AdminConfig, pool: PgPool) -> Self {
        let storage = StorageService::new(&config.storage).await;

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the object storage service.
    #[must_use]
    pub fn storage(&self) -> &StorageService {
        &self.inner.storage
    }
}
