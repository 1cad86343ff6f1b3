//! Deterministic offline climate source
//!
//! Every value is derived from the sum of the UTF-16 code units of the
//! location name, so the same city always reports the same conditions.

use super::ClimateProvider;
use crate::Result;
use crate::models::{ClimateData, Location};
use async_trait::async_trait;
use chrono::NaiveDate;

#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticProvider;

/// Sum of the name's UTF-16 code units
#[must_use]
pub fn city_hash(name: &str) -> u64 {
    name.encode_utf16().map(u64::from).sum()
}

/// Synthetic conditions for a city name
#[must_use]
pub fn climate_for(name: &str) -> ClimateData {
    let h = city_hash(name);
    ClimateData {
        temperature: (70 + h % 35) as f64,
        humidity: (40 + h % 50) as f64,
        uv_index: (1 + h % 11) as f64,
        aqi: (10 + h % 250) as f64,
        rain_probability: (h % 100) as f64,
    }
}

impl SyntheticProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Stable pseudo-coordinates so distinct cities get distinct cache keys
    fn coordinates_for(name: &str) -> (f64, f64) {
        let h = city_hash(name);
        let lat = (h.wrapping_mul(7919) % 17_000) as f64 / 100.0 - 85.0;
        let lon = (h.wrapping_mul(104_729) % 36_000) as f64 / 100.0 - 180.0;
        (lat, lon)
    }
}

#[async_trait]
impl ClimateProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn current(&self, location: &Location) -> Result<ClimateData> {
        Ok(climate_for(&location.name))
    }

    async fn yesterday(&self, location: &Location, _date: NaiveDate) -> Result<ClimateData> {
        let today = climate_for(&location.name);
        let h = city_hash(&location.name);
        // shift by -3..=3 °F and -10..=10 AQI
        let temp_delta = (h % 7) as f64 - 3.0;
        let aqi_delta = (h % 21) as f64 - 10.0;
        Ok(ClimateData {
            temperature: today.temperature - temp_delta,
            aqi: (today.aqi - aqi_delta).max(0.0),
            rain_probability: 0.0,
            ..today
        })
    }

    async fn geocode(&self, name: &str) -> Result<Vec<Location>> {
        let (lat, lon) = Self::coordinates_for(name);
        Ok(vec![Location::new(lat, lon, name.to_string())])
    }
}
