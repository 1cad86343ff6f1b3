//! Climate snapshot model

use serde::{Deserialize, Serialize};

/// Point-in-time climate conditions for one location
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClimateData {
    /// Temperature in Fahrenheit
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub uv_index: f64,
    /// US Air Quality Index
    pub aqi: f64,
    /// Chance of rain in percent
    pub rain_probability: f64,
}

impl ClimateData {
    /// Substitute used when current conditions cannot be fetched
    pub const CURRENT_FALLBACK: ClimateData = ClimateData {
        temperature: 75.0,
        humidity: 50.0,
        uv_index: 5.0,
        aqi: 50.0,
        rain_probability: 10.0,
    };

    /// Substitute used when yesterday's conditions cannot be fetched
    pub const YESTERDAY_FALLBACK: ClimateData = ClimateData {
        temperature: 72.0,
        humidity: 55.0,
        uv_index: 4.0,
        aqi: 70.0,
        rain_probability: 0.0,
    };

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.0}°F", self.temperature)
    }

    /// One-line summary for terminal output
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} | humidity {:.0}% | UV {:.0} | AQI {:.0} | rain {:.0}%",
            self.format_temperature(),
            self.humidity,
            self.uv_index,
            self.aqi,
            self.rain_probability
        )
    }
}
