//! Open-Meteo client for current conditions, air quality, archive and geocoding
//!
//! No API key is required. All four endpoints are configurable so tests can
//! point them at a local mock server.

use super::ClimateProvider;
use crate::config::ClimateConfig;
use crate::models::{ClimateData, Location};
use crate::{Result, StepSafeError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

pub struct OpenMeteoProvider {
    client: ClientWithMiddleware,
    forecast_url: String,
    air_quality_url: String,
    archive_url: String,
    geocoding_url: String,
}

impl OpenMeteoProvider {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &ClimateConfig) -> Self {
        Self {
            client,
            forecast_url: config.forecast_url.trim_end_matches('/').to_string(),
            air_quality_url: config.air_quality_url.trim_end_matches('/').to_string(),
            archive_url: config.archive_url.trim_end_matches('/').to_string(),
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, what: &str) -> Result<T> {
        debug!("Calling the {what} API");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepSafeError::api(format!("{what} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StepSafeError::api(format!(
                "Open-Meteo {what} API failed with status {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StepSafeError::api(format!("Failed to parse {what} response: {e}")))
    }

    fn forecast_request(&self, location: &Location) -> String {
        format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,rain,uv_index&temperature_unit=fahrenheit",
            self.forecast_url, location.latitude, location.longitude
        )
    }

    fn air_quality_request(&self, location: &Location) -> String {
        format!(
            "{}?latitude={}&longitude={}&current=us_aqi",
            self.air_quality_url, location.latitude, location.longitude
        )
    }

    fn archive_request(&self, location: &Location, date: NaiveDate) -> String {
        format!(
            "{}?latitude={}&longitude={}&start_date={date}&end_date={date}&daily=temperature_2m_max,relative_humidity_2m_mean,uv_index_max&temperature_unit=fahrenheit",
            self.archive_url, location.latitude, location.longitude
        )
    }
}

#[async_trait]
impl ClimateProvider for OpenMeteoProvider {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    #[instrument(skip(self), fields(location = %location.name))]
    async fn current(&self, location: &Location) -> Result<ClimateData> {
        let (weather, air): (openmeteo::ForecastResponse, openmeteo::AirQualityResponse) =
            futures::try_join!(
                self.get_json(self.forecast_request(location), "weather"),
                self.get_json(self.air_quality_request(location), "air quality"),
            )?;

        Ok(ClimateData {
            temperature: weather.current.temperature_2m.round(),
            humidity: weather.current.relative_humidity_2m.round(),
            uv_index: weather.current.uv_index.unwrap_or(0.0).round(),
            aqi: air.current.us_aqi.unwrap_or(0.0).round(),
            rain_probability: if weather.current.rain.unwrap_or(0.0) > 0.0 {
                100.0
            } else {
                0.0
            },
        })
    }

    #[instrument(skip(self), fields(location = %location.name))]
    async fn yesterday(&self, location: &Location, date: NaiveDate) -> Result<ClimateData> {
        let archive: openmeteo::ArchiveResponse = self
            .get_json(self.archive_request(location, date), "archive")
            .await?;

        let first = |values: &[Option<f64>], field: &str| -> Result<f64> {
            values
                .first()
                .copied()
                .flatten()
                .map(f64::round)
                .ok_or_else(|| {
                    StepSafeError::api(format!("Archive response has no {field} for {date}"))
                })
        };

        Ok(ClimateData {
            temperature: first(&archive.daily.temperature_2m_max, "temperature")?,
            humidity: first(&archive.daily.relative_humidity_2m_mean, "humidity")?,
            uv_index: first(&archive.daily.uv_index_max, "UV index")?,
            // the archive has no air quality or rain chance for past days
            aqi: ClimateData::YESTERDAY_FALLBACK.aqi,
            rain_probability: 0.0,
        })
    }

    #[instrument(skip(self))]
    async fn geocode(&self, name: &str) -> Result<Vec<Location>> {
        let url = format!(
            "{}?name={}&count=5&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name)
        );
        let response: openmeteo::GeocodingResponse = self.get_json(url, "geocoding").await?;

        Ok(response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Location::from)
            .collect())
    }
}

/// `OpenMeteo` API response structures
mod openmeteo {
    use super::{Deserialize, Location};

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current: CurrentWeather,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeather {
        pub temperature_2m: f64,
        pub relative_humidity_2m: f64,
        pub rain: Option<f64>,
        pub uv_index: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirQualityResponse {
        pub current: CurrentAirQuality,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentAirQuality {
        pub us_aqi: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ArchiveResponse {
        pub daily: DailyArchive,
    }

    #[derive(Debug, Deserialize)]
    pub struct DailyArchive {
        #[serde(default)]
        pub temperature_2m_max: Vec<Option<f64>>,
        #[serde(default)]
        pub relative_humidity_2m_mean: Vec<Option<f64>>,
        #[serde(default)]
        pub uv_index_max: Vec<Option<f64>>,
    }

    /// Geocoding response from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
        pub admin1: Option<String>,
    }

    impl From<GeocodingResult> for Location {
        fn from(result: GeocodingResult) -> Self {
            let name = match result.admin1 {
                Some(region) if region != result.name => format!("{}, {}", result.name, region),
                _ => result.name,
            };
            Location {
                latitude: result.latitude,
                longitude: result.longitude,
                name,
                country: result.country,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenMeteoProvider {
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build();
        OpenMeteoProvider::new(client, &ClimateConfig::default())
    }

    #[test]
    fn test_request_urls() {
        let provider = provider();
        let location = Location::new(33.45, -112.07, "Phoenix".to_string());

        let forecast = provider.forecast_request(&location);
        assert!(forecast.starts_with(
            "https://api.open-meteo.com/v1/forecast?latitude=33.45&longitude=-112.07"
        ));
        assert!(forecast.contains("current=temperature_2m,relative_humidity_2m,rain,uv_index"));
        assert!(forecast.ends_with("temperature_unit=fahrenheit"));

        assert!(provider.air_quality_request(&location).ends_with("current=us_aqi"));

        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let archive = provider.archive_request(&location, date);
        assert!(archive.contains("start_date=2024-07-01&end_date=2024-07-01"));
        assert!(
            archive.contains("daily=temperature_2m_max,relative_humidity_2m_mean,uv_index_max")
        );
    }

    #[test]
    fn test_geocoding_result_naming() {
        let json = r#"{"results":[{"name":"Springfield","latitude":39.8,"longitude":-89.6,"country":"United States","admin1":"Illinois"}]}"#;
        let response: openmeteo::GeocodingResponse = serde_json::from_str(json).unwrap();
        let location = Location::from(response.results.unwrap().remove(0));
        assert_eq!(location.name, "Springfield, Illinois");
        assert_eq!(location.country.as_deref(), Some("United States"));
    }
}
