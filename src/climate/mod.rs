//! Climate data service
//!
//! [`ClimateService`] wraps a [`ClimateProvider`] with a persistent TTL cache
//! and substitutes fixed fallback snapshots when the provider fails, so callers
//! always receive a [`ClimateData`] value.

pub mod open_meteo;
pub mod synthetic;

use crate::Result;
use crate::cache::{self, PersistentCache};
use crate::config::StepSafeConfig;
use crate::models::{ClimateData, Location};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub use open_meteo::OpenMeteoProvider;
pub use synthetic::SyntheticProvider;

/// Source of climate snapshots and place names
#[async_trait]
pub trait ClimateProvider: Send + Sync {
    /// Short stable identifier, part of every cache key
    fn name(&self) -> &'static str;

    /// Current conditions at a location
    async fn current(&self, location: &Location) -> Result<ClimateData>;

    /// Conditions observed on `date`, a past day
    async fn yesterday(&self, location: &Location, date: NaiveDate) -> Result<ClimateData>;

    /// Candidate locations for a place name, best match first
    async fn geocode(&self, name: &str) -> Result<Vec<Location>>;
}

const YESTERDAY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct ClimateService {
    provider: Arc<dyn ClimateProvider>,
    cache: Arc<PersistentCache>,
    current_ttl: Duration,
}

impl ClimateService {
    pub fn new(
        provider: Arc<dyn ClimateProvider>,
        cache: Arc<PersistentCache>,
        current_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            current_ttl,
        }
    }

    /// Build the provider named in the configuration
    pub fn from_config(
        config: &StepSafeConfig,
        client: ClientWithMiddleware,
        cache: Arc<PersistentCache>,
    ) -> Self {
        let provider: Arc<dyn ClimateProvider> = match config.climate.provider.as_str() {
            "synthetic" => Arc::new(SyntheticProvider::new()),
            _ => Arc::new(OpenMeteoProvider::new(client, &config.climate)),
        };
        let ttl = Duration::from_secs(u64::from(config.cache.ttl_minutes) * 60);
        Self::new(provider, cache, ttl)
    }

    #[must_use]
    pub fn provider(&self) -> &dyn ClimateProvider {
        self.provider.as_ref()
    }

    /// Current conditions, from cache when fresh, else the provider, else the fallback
    #[instrument(skip(self), fields(location = %location.name))]
    pub async fn current(&self, location: &Location) -> ClimateData {
        let key = self.cache_key(location, "current");
        if let Some(cached) = self.cached(&key).await {
            return cached;
        }

        match self.provider.current(location).await {
            Ok(climate) => {
                self.store(&key, climate, self.current_ttl).await;
                climate
            }
            Err(e) => {
                warn!("Failed to fetch current climate data, using fallback: {e}");
                ClimateData::CURRENT_FALLBACK
            }
        }
    }

    /// Yesterday's conditions relative to today's UTC date
    pub async fn yesterday(&self, location: &Location) -> ClimateData {
        let today = Utc::now().date_naive();
        let date = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        self.yesterday_on(location, date).await
    }

    /// Conditions for a specific past day, cached for about a day
    #[instrument(skip(self), fields(location = %location.name))]
    pub async fn yesterday_on(&self, location: &Location, date: NaiveDate) -> ClimateData {
        let key = self.cache_key(location, &format!("yesterday-{date}"));
        if let Some(cached) = self.cached(&key).await {
            return cached;
        }

        match self.provider.yesterday(location, date).await {
            Ok(climate) => {
                self.store(&key, climate, cache::jittered(YESTERDAY_TTL)).await;
                climate
            }
            Err(e) => {
                warn!("Failed to fetch historical climate data, using fallback: {e}");
                ClimateData::YESTERDAY_FALLBACK
            }
        }
    }

    /// Entries from different providers never collide, e.g. `synthetic:current-40.7000--74.0000`
    fn cache_key(&self, location: &Location, kind: &str) -> String {
        format!("{}:{}", self.provider.name(), location.cache_key(kind))
    }

    async fn cached(&self, key: &str) -> Option<ClimateData> {
        match self.cache.get::<ClimateData>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Climate cache read failed for {key}: {e}");
                None
            }
        }
    }

    async fn store(&self, key: &str, climate: ClimateData, ttl: Duration) {
        if let Err(e) = self.cache.put(key, climate, ttl).await {
            warn!("Climate cache write failed for {key}: {e}");
        } else {
            debug!("Cached climate data under {key}");
        }
    }
}
