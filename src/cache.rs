use anyhow::{Result, anyhow};
use fjall::{Database, Keyspace};
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// TTL cache backed by a fjall keyspace, shared between requests behind an `Arc`
pub struct PersistentCache {
    db: Database,
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Scale a TTL by a random factor in 0.9..1.1 so entries written together expire apart
#[must_use]
pub fn jittered(ttl: Duration) -> Duration {
    let jitter: f64 = rand::rng().random_range(0.9..1.1);
    ttl.mul_f64(jitter)
}

impl PersistentCache {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(&path).open()?;
        let store = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { db, store })
    }

    /// Another keyspace in the same database, used by stores that never expire
    pub fn keyspace(&self, name: &str) -> Result<Keyspace> {
        Ok(self
            .db
            .keyspace(name, fjall::KeyspaceCreateOptions::default)?)
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
    /// Returns `None` for cache misses, expired entries and entries that no longer decode.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = match postcard::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Dropping undecodable cache entry: {e}");
                self.remove(key).await?;
                return Ok(None);
            }
        };

        if unix_now()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("answer", 42u32, Duration::from_secs(60))
            .await
            .unwrap();
        let value: Option<u32> = cache.get("answer").await.unwrap();
        assert_eq!(value, Some(42));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("stale", "old".to_string(), Duration::ZERO)
            .await
            .unwrap();
        let value: Option<String> = cache.get("stale").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_missing_key_and_remove() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        let missing: Option<u32> = cache.get("nothing").await.unwrap();
        assert!(missing.is_none());

        cache.put("gone", 1u8, Duration::from_secs(60)).await.unwrap();
        cache.remove("gone").await.unwrap();
        let value: Option<u8> = cache.get("gone").await.unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let ttl = Duration::from_secs(1000);
        for _ in 0..50 {
            let secs = jittered(ttl).as_secs_f64();
            assert!((900.0..=1100.0).contains(&secs), "got {secs}");
        }
    }
}
