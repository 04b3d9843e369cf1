use std::sync::Arc;

use qb_db::Store;

use crate::{
    config::CoreConfig,
    source::{DocumentSource, FsSource},
    writer::WriteQueue,
};

/// Everything the core needs, built once and passed to whoever hosts sessions.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub source: Arc<dyn DocumentSource>,
    pub writes: WriteQueue,
    pub config: CoreConfig,
}

impl AppState {
    /// Connect to the configured database, migrate it and start the write queue.
    pub async fn new(config: CoreConfig) -> anyhow::Result<Self> {
        let pool = qb_db::create_pool(&config.database_url, config.max_connections).await?;
        qb_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

        let source = Arc::new(FsSource::new(config.assets_dir.clone()));

        tracing::info!("Opened question store at {}", config.database_url);

        Ok(Self::from_parts(config, Store::new(pool), source))
    }

    /// Assemble a state from already constructed collaborators.
    ///
    /// Must be called inside a Tokio runtime: the write queue worker is spawned here.
    pub fn from_parts(config: CoreConfig, store: Store, source: Arc<dyn DocumentSource>) -> Self {
        let writes = WriteQueue::spawn(store.clone());

        Self {
            store,
            source,
            writes,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("writes", &self.writes)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
