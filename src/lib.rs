pub mod cache;
pub mod config;
pub mod controllers;
pub mod core;
pub mod models;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

// Shared state для всего приложения
pub struct AppState {
    pub config: config::Config,
    pub cache: cache::ScrapeCache,
    pub history: store::HistoryStore,
    pub snapshots: store::SnapshotStore,
    pub overrides: store::OverrideStore,
    locks: EventLocks,
}

impl AppState {
    pub async fn new(config: config::Config) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let history = store::HistoryStore::open(&config.storage.data_dir).await?;
        let snapshots = store::SnapshotStore::open(&config.storage.data_dir).await?;
        let overrides = store::OverrideStore::open(&config.storage.data_dir).await?;
        let cache = cache::ScrapeCache::new(Duration::from_secs(config.cache.report_ttl_seconds));

        Ok(Arc::new(Self {
            config,
            cache,
            history,
            snapshots,
            overrides,
            locks: EventLocks::default(),
        }))
    }

    /// Не больше одного прохода сверки на событие одновременно: проход
    /// делает read-modify-write по истории и снимку события.
    pub async fn lock_event(&self, event_id: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(event_id).await
    }
}

// Пер-событийные замки, создаются лениво и не удаляются: событий немного,
// живут они недолго.
#[derive(Default)]
struct EventLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EventLocks {
    async fn acquire(&self, event_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inner = self.inner.lock().await;
            inner
                .entry(event_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_lock_serializes_same_event() {
        let locks = EventLocks::default();
        let guard = locks.acquire("ev").await;

        // Чужое событие не блокируется.
        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ev2")).await;
        assert!(other.is_ok());

        // То же событие ждёт освобождения.
        let same = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ev")).await;
        assert!(same.is_err());

        drop(guard);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ev")).await;
        assert!(again.is_ok());
    }
}
