//! store.rs
//!
//! Персистентность для ядра: три узких key-value хранилища по id события -
//! история свободных мест, снимок счётчиков прошлого прогона и ручные правки.
//! Все три ходят через один JSON-файловый движок; сломанная или отсутствующая
//! запись читается как пустое состояние и никогда не поднимается ошибкой
//! наверх.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::models::{OverrideMap, SeatHistory, StatsSnapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON-файловый движок: `data_dir/<вид>/<событие>.json`.
#[derive(Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub async fn open(data_dir: &Path, kind: &str) -> Result<Self, StoreError> {
        let dir = data_dir.join(kind);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(JsonFileStore { dir })
    }

    fn path_for(&self, event_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_event_id(event_id)))
    }

    /// Чтение записи; нечитаемая или отсутствующая запись = `None`.
    pub async fn read<T: DeserializeOwned>(&self, event_id: &str) -> Option<T> {
        let path = self.path_for(event_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                // Битый файл читается как свежий старт.
                warn!("Corrupt record {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Атомарная запись: сначала во временный файл, потом rename.
    pub async fn write<T: Serialize>(&self, event_id: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path_for(event_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    pub async fn remove(&self, event_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(event_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// Id события попадает в имя файла, всё кроме [A-Za-z0-9_-] заменяется на '_'.
fn sanitize_event_id(event_id: &str) -> String {
    event_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// История свободных мест по событию.
#[derive(Clone)]
pub struct HistoryStore {
    inner: JsonFileStore,
}

impl HistoryStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(HistoryStore {
            inner: JsonFileStore::open(data_dir, "history").await?,
        })
    }

    pub async fn load(&self, event_id: &str) -> SeatHistory {
        self.inner.read(event_id).await.unwrap_or_default()
    }

    pub async fn save(&self, event_id: &str, history: &SeatHistory) -> Result<(), StoreError> {
        self.inner.write(event_id, history).await
    }

    pub async fn clear(&self, event_id: &str) -> Result<(), StoreError> {
        self.inner.remove(event_id).await
    }
}

/// Снимок счётчиков занятых мест прошлого прогона.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: JsonFileStore,
}

impl SnapshotStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(SnapshotStore {
            inner: JsonFileStore::open(data_dir, "snapshots").await?,
        })
    }

    pub async fn load(&self, event_id: &str) -> Option<StatsSnapshot> {
        self.inner.read(event_id).await
    }

    pub async fn save(&self, event_id: &str, snapshot: &StatsSnapshot) -> Result<(), StoreError> {
        self.inner.write(event_id, snapshot).await
    }

    pub async fn clear(&self, event_id: &str) -> Result<(), StoreError> {
        self.inner.remove(event_id).await
    }
}

/// Ручные правки оператора; живут отдельно от данных скрейпа.
#[derive(Clone)]
pub struct OverrideStore {
    inner: JsonFileStore,
}

impl OverrideStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(OverrideStore {
            inner: JsonFileStore::open(data_dir, "overrides").await?,
        })
    }

    pub async fn load(&self, event_id: &str) -> OverrideMap {
        self.inner.read(event_id).await.unwrap_or_default()
    }

    pub async fn save(&self, event_id: &str, overrides: &OverrideMap) -> Result<(), StoreError> {
        self.inner.write(event_id, overrides).await
    }

    pub async fn clear(&self, event_id: &str) -> Result<(), StoreError> {
        self.inner.remove(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vendor;

    #[tokio::test]
    async fn history_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).await.unwrap();

        let mut history = SeatHistory::default();
        history.seats.insert("A:1-1".to_string(), Vendor::Ebilet);

        store.save("koncert-2026", &history).await.unwrap();
        let loaded = store.load("koncert-2026").await;
        assert_eq!(loaded.seats.get("A:1-1"), Some(&Vendor::Ebilet));

        store.clear("koncert-2026").await.unwrap();
        assert!(store.load("koncert-2026").await.is_empty());
    }

    #[tokio::test]
    async fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).await.unwrap();
        assert!(store.load("nope").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_record_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).await.unwrap();

        let path = dir.path().join("history").join("ev.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        assert!(store.load("ev").await.is_empty());
    }

    #[tokio::test]
    async fn event_ids_are_sanitized_for_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = OverrideStore::open(dir.path()).await.unwrap();

        let mut overrides = OverrideMap::default();
        overrides.seats.insert(
            "1-1".to_string(),
            crate::models::OverrideEntry {
                class: crate::models::SeatClass::NotForSale,
                vendor: None,
            },
        );
        store.save("tour/2026?x", &overrides).await.unwrap();
        let loaded = store.load("tour/2026?x").await;
        assert_eq!(loaded.seats.len(), 1);
    }

    #[tokio::test]
    async fn clearing_missing_record_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).await.unwrap();
        store.clear("never-saved").await.unwrap();
    }
}
