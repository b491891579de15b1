//! # Durable Storage
//!
//! A [`ResourceActor`](crate::ResourceActor) keeps its entities in memory, but every mutation is
//! written through a [`Store`] **before** the actor commits it and answers the caller. If the write
//! fails, the in-memory state is left untouched and the caller receives
//! [`FrameworkError::Store`](crate::FrameworkError::Store).
//!
//! Two backends ship with the framework:
//!
//! | Backend | Durability | Use Case |
//! |---------|------------|----------|
//! | [`MemoryStore`] | Process lifetime | Tests, demos, default wiring |
//! | [`JsonFileStore`] | Survives restarts | Single-node deployments |
//!
//! The trait is generic over the key and value so the same contract serves entity actors
//! (`T::Id -> T`) and plain counters (e.g. a date-scoped sequence).
//!
//! `put` receives every record touched by one request and must apply them as a unit: either all
//! of them become visible to the next `load`, or none do.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value persistence contract used by actors.
#[async_trait]
pub trait Store<K, V>: Send + Sync
where
    K: Send + 'static,
    V: Send + 'static,
{
    /// Returns every persisted record. Called once when an actor is restored.
    async fn load(&self) -> Result<Vec<(K, V)>, StoreError>;

    /// Upserts all `records` atomically.
    async fn put(&self, records: Vec<(K, V)>) -> Result<(), StoreError>;

    /// Removes the record stored under `key`. Removing an absent key is not an error.
    async fn delete(&self, key: K) -> Result<(), StoreError>;
}

/// Shared handle to a store, as held by actors.
pub type SharedStore<K, V> = Arc<dyn Store<K, V>>;

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-process store. Clones share the same records, which lets tests inspect what an actor wrote.
pub struct MemoryStore<K, V> {
    records: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> MemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Copies the current records.
    pub fn records(&self) -> HashMap<K, V> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl<K, V> Default for MemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for MemoryStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl<K, V> Store<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<(K, V)>, StoreError> {
        Ok(self
            .records
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn put(&self, records: Vec<(K, V)>) -> Result<(), StoreError> {
        let mut guard = self.records.lock();
        guard.extend(records);
        Ok(())
    }

    async fn delete(&self, key: K) -> Result<(), StoreError> {
        self.records.lock().remove(&key);
        Ok(())
    }
}

// =============================================================================
// JSON FILE BACKEND
// =============================================================================

/// Snapshot-per-write file store.
///
/// The full record set is serialized as a JSON array of `[key, value]` pairs, written to a sibling
/// `*.tmp` file and renamed over the target, so a crash mid-write leaves the previous snapshot intact.
/// Writes are serialized through an async mutex; the cached records only change after the rename
/// succeeds.
pub struct JsonFileStore<K, V> {
    path: PathBuf,
    records: tokio::sync::Mutex<HashMap<K, V>>,
}

impl<K, V> JsonFileStore<K, V>
where
    K: Eq + Hash + Clone + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    /// Opens (or lazily creates) the snapshot at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<(K, V)>>(&bytes)?
                .into_iter()
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), records = records.len(), "Opened JSON store");

        Ok(Self {
            path,
            records: tokio::sync::Mutex::new(records),
        })
    }

    async fn write_snapshot(&self, records: &HashMap<K, V>) -> Result<(), StoreError> {
        let pairs: Vec<(&K, &V)> = records.iter().collect();
        let bytes = serde_json::to_vec(&pairs)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl<K, V> Store<K, V> for JsonFileStore<K, V>
where
    K: Eq + Hash + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<(K, V)>, StoreError> {
        let guard = self.records.lock().await;
        Ok(guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn put(&self, records: Vec<(K, V)>) -> Result<(), StoreError> {
        let mut guard = self.records.lock().await;
        let mut next = guard.clone();
        next.extend(records);
        self.write_snapshot(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn delete(&self, key: K) -> Result<(), StoreError> {
        let mut guard = self.records.lock().await;
        if !guard.contains_key(&key) {
            return Ok(());
        }
        let mut next = guard.clone();
        next.remove(&key);
        self.write_snapshot(&next).await?;
        *guard = next;
        Ok(())
    }
}
