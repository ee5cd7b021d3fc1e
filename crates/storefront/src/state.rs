//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::BakehouseConfig;
use crate::services::avatar::AvatarStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BakehouseConfig,
    pool: PgPool,
    avatars: AvatarStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: BakehouseConfig, pool: PgPool) -> Self {
        let avatars = AvatarStore::new(config.upload_dir.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                avatars,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &BakehouseConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the profile picture store.
    #[must_use]
    pub fn avatars(&self) -> &AvatarStore {
        &self.inner.avatars
    }
}
