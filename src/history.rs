//! Per-user exposure history
//!
//! Records live in their own keyspace of the cache database, one postcard
//! encoded list per user. Writes are serialized through a lock so concurrent
//! reports for the same user cannot drop each other's records.

use crate::cache::PersistentCache;
use crate::models::ExposureRecord;
use crate::{Result, StepSafeError};
use fjall::Keyspace;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, instrument};

const KEYSPACE: &str = "exposure";

pub struct ExposureStore {
    store: Keyspace,
    write_lock: Mutex<()>,
}

fn cache_error(e: impl std::fmt::Display) -> StepSafeError {
    StepSafeError::cache(e.to_string())
}

impl ExposureStore {
    pub fn open(cache: &PersistentCache) -> Result<Self> {
        let store = cache.keyspace(KEYSPACE).map_err(cache_error)?;
        Ok(Self {
            store,
            write_lock: Mutex::new(()),
        })
    }

    async fn read(&self, user_id: &str) -> Result<Vec<ExposureRecord>> {
        let store = self.store.clone();
        let key = user_id.as_bytes().to_vec();
        let bytes = task::spawn_blocking(move || store.get(key).map(|v| v.map(|v| v.to_vec())))
            .await
            .map_err(cache_error)?
            .map_err(cache_error)?;

        match bytes {
            Some(bytes) => postcard::from_bytes(&bytes).map_err(cache_error),
            None => Ok(Vec::new()),
        }
    }

    /// Store a record, replacing any earlier record for the same day
    #[instrument(skip(self, record), fields(date = %record.date))]
    pub async fn append(&self, user_id: &str, record: ExposureRecord) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(StepSafeError::validation("User id cannot be empty"));
        }

        let _guard = self.write_lock.lock().await;
        let mut records = self.read(user_id).await?;
        records.retain(|existing| existing.date != record.date);
        records.push(record);
        records.sort_by_key(|r| r.date);

        let bytes = postcard::to_stdvec(&records).map_err(cache_error)?;
        let store = self.store.clone();
        let key = user_id.as_bytes().to_vec();
        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(cache_error)?
            .map_err(cache_error)?;

        debug!("Stored {} exposure records", records.len());
        Ok(())
    }

    /// All records for a user, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<ExposureRecord>> {
        let mut records = self.read(user_id).await?;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(day: u32, score: u8) -> ExposureRecord {
        ExposureRecord {
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            personal_health_risk_score: score,
            max_heat: 90.0,
            max_aqi: 60.0,
            max_uv: 7.0,
        }
    }

    #[tokio::test]
    async fn test_append_and_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let store = ExposureStore::open(&cache).unwrap();

        store.append("alice", record(2, 40)).await.unwrap();
        store.append("alice", record(1, 30)).await.unwrap();
        store.append("alice", record(3, 50)).await.unwrap();

        let dates: Vec<u32> = store
            .list("alice")
            .await
            .unwrap()
            .iter()
            .map(|r| chrono::Datelike::day(&r.date))
            .collect();
        assert_eq!(dates, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_same_day_replaces_and_users_are_separate() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let store = ExposureStore::open(&cache).unwrap();

        store.append("alice", record(1, 30)).await.unwrap();
        store.append("alice", record(1, 70)).await.unwrap();

        let alice = store.list("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].personal_health_risk_score, 70);

        assert!(store.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_user_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let store = ExposureStore::open(&cache).unwrap();

        let err = store.append(" ", record(1, 10)).await.unwrap_err();
        assert!(matches!(err, StepSafeError::Validation { .. }));
    }
}
