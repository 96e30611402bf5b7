//! Shared handler state.

use crate::config::CollectorConfig;
use crate::error::ApiError;
use crate::registry::SubscriberRegistry;
use rfnet_persistence::{PersistenceResult, ReadingStore};
use std::sync::Arc;

/// State shared by all axum handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ReadingStore>,
    registry: Arc<SubscriberRegistry>,
    config: Arc<CollectorConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, config: CollectorConfig) -> Self {
        Self {
            store,
            registry: Arc::new(SubscriberRegistry::new(config.subscriber_queue_capacity)),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> Arc<SubscriberRegistry> {
        self.registry.clone()
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Run a blocking store operation off the async workers.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn ReadingStore) -> PersistenceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
            .map_err(ApiError::from)
    }
}
