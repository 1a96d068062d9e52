use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

use crate::TrackerError;
use crate::snapshot::StationSnapshot;

const LAST_SNAPSHOT_KEY: &str = "snapshot:last_live";

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Persistent key-value cache with per-entry expiry, holding the last live snapshot
pub struct SnapshotCache {
    store: Keyspace,
    ttl: Duration,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl SnapshotCache {
    /// Open (or create) the cache database at `path`
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> crate::Result<Self> {
        let store = Self::open_keyspace(path)
            .map_err(|e| TrackerError::cache(format!("Failed to open snapshot cache: {e}")))?;
        Ok(SnapshotCache { store, ttl })
    }

    fn open_keyspace(path: impl AsRef<Path>) -> Result<Keyspace> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("snapshots", fjall::KeyspaceCreateOptions::default)?;
        Ok(items)
    }

    /// Remember a live snapshot for the configured TTL
    pub async fn store_snapshot(&self, snapshot: &StationSnapshot) -> Result<()> {
        // Payloads may hold arbitrary JSON, so the snapshot is kept as JSON text
        let json = serde_json::to_string(snapshot)?;
        self.put(LAST_SNAPSHOT_KEY, json, self.ttl).await
    }

    /// The last live snapshot, if it has not expired
    pub async fn last_snapshot(&self) -> Result<Option<StationSnapshot>> {
        match self.get::<String>(LAST_SNAPSHOT_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        // Calculate expiry time
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        if let Some(bytes) = maybe_bytes {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}
