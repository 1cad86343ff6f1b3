//! Climate risk engine
//!
//! Maps a [`ClimateData`] snapshot to an ordinal [`RiskLevel`] per factor and
//! derives the preparation checklist and time-of-day guidance from the result.
//! Every function here is pure; the same snapshot always yields the same profile.

pub mod checklist;
pub mod factors;
pub mod time_windows;

use crate::models::ClimateData;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use checklist::{ChecklistItem, ChecklistKind, generate_checklist};
pub use factors::heat_index;
pub use time_windows::{TimeWindow, WindowLevel, generate_time_windows};

/// Ordinal risk classification shared by all factors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    /// High or Extreme
    #[must_use]
    pub fn is_elevated(self) -> bool {
        self >= RiskLevel::High
    }

    /// Position on the ordinal scale (0-3)
    #[must_use]
    pub fn points(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Extreme => 3,
        }
    }

    /// One step down the scale, saturating at Low
    #[must_use]
    pub fn lowered(self) -> Self {
        match self {
            RiskLevel::Extreme => RiskLevel::High,
            RiskLevel::High => RiskLevel::Medium,
            RiskLevel::Medium | RiskLevel::Low => RiskLevel::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Extreme => "Extreme",
        };
        f.write_str(name)
    }
}

/// Climate factors assessed independently
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskFactor {
    Heat,
    Uv,
    AirQuality,
    Humidity,
    Rain,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 5] = [
        RiskFactor::Heat,
        RiskFactor::Uv,
        RiskFactor::AirQuality,
        RiskFactor::Humidity,
        RiskFactor::Rain,
    ];

    /// Display name used on risk cards
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            RiskFactor::Heat => "Heat Risk",
            RiskFactor::Uv => "UV Risk",
            RiskFactor::AirQuality => "Air Quality (AQI)",
            RiskFactor::Humidity => "Humidity Comfort",
            RiskFactor::Rain => "Rain Exposure",
        }
    }

    /// Lower-case phrase for generated sentences
    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            RiskFactor::Heat => "heat",
            RiskFactor::Uv => "UV exposure",
            RiskFactor::AirQuality => "air pollution",
            RiskFactor::Humidity => "humidity",
            RiskFactor::Rain => "rain",
        }
    }
}

/// Assessment of one factor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Risk {
    pub name: String,
    pub level: RiskLevel,
    pub explanation: String,
}

impl Risk {
    fn new(factor: RiskFactor, level: RiskLevel, explanation: &str) -> Self {
        Self {
            name: factor.display_name().to_string(),
            level,
            explanation: explanation.to_string(),
        }
    }
}

/// Per-factor assessment of one climate snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub heat_risk: Risk,
    pub uv_risk: Risk,
    pub aqi_risk: Risk,
    pub humidity_discomfort: Risk,
    pub rain_exposure: Risk,
}

impl RiskProfile {
    #[must_use]
    pub fn risk(&self, factor: RiskFactor) -> &Risk {
        match factor {
            RiskFactor::Heat => &self.heat_risk,
            RiskFactor::Uv => &self.uv_risk,
            RiskFactor::AirQuality => &self.aqi_risk,
            RiskFactor::Humidity => &self.humidity_discomfort,
            RiskFactor::Rain => &self.rain_exposure,
        }
    }

    #[must_use]
    pub fn level(&self, factor: RiskFactor) -> RiskLevel {
        self.risk(factor).level
    }

    /// Highest level across all factors
    #[must_use]
    pub fn overall_level(&self) -> RiskLevel {
        RiskFactor::ALL
            .iter()
            .map(|factor| self.level(*factor))
            .max()
            .unwrap_or(RiskLevel::Low)
    }

    /// Factors above Low, most severe first
    #[must_use]
    pub fn notable_factors(&self) -> Vec<RiskFactor> {
        let mut factors: Vec<RiskFactor> = RiskFactor::ALL
            .into_iter()
            .filter(|factor| self.level(*factor) > RiskLevel::Low)
            .collect();
        // stable sort keeps the heat, UV, AQI, humidity, rain order among equals
        factors.sort_by(|a, b| self.level(*b).cmp(&self.level(*a)));
        factors
    }

    /// Heat or UV at High or above, which makes the midday hours unsafe
    #[must_use]
    pub fn has_midday_hazard(&self) -> bool {
        self.heat_risk.level.is_elevated() || self.uv_risk.level.is_elevated()
    }
}

/// Classify every factor of a climate snapshot
#[must_use]
pub fn analyze_risks(climate: &ClimateData) -> RiskProfile {
    RiskProfile {
        heat_risk: factors::heat_risk(climate.temperature, climate.humidity),
        uv_risk: factors::uv_risk(climate.uv_index),
        aqi_risk: factors::aqi_risk(climate.aqi),
        humidity_discomfort: factors::humidity_discomfort(climate.humidity),
        rain_exposure: factors::rain_exposure(climate.rain_probability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climate(temperature: f64, humidity: f64, uv: f64, aqi: f64, rain: f64) -> ClimateData {
        ClimateData {
            temperature,
            humidity,
            uv_index: uv,
            aqi,
            rain_probability: rain,
        }
    }

    #[test]
    fn test_pleasant_day_is_low_everywhere() {
        let profile = analyze_risks(&climate(72.0, 40.0, 1.0, 20.0, 5.0));
        assert_eq!(profile.overall_level(), RiskLevel::Low);
        assert!(profile.notable_factors().is_empty());
        assert!(!profile.has_midday_hazard());
        assert_eq!(profile.heat_risk.name, "Heat Risk");
        assert_eq!(
            profile.heat_risk.explanation,
            "Pleasant conditions. Enjoy your time outdoors."
        );
    }

    #[test]
    fn test_factors_are_independent() {
        let profile = analyze_risks(&climate(72.0, 40.0, 1.0, 250.0, 5.0));
        assert_eq!(profile.aqi_risk.level, RiskLevel::Extreme);
        assert_eq!(profile.heat_risk.level, RiskLevel::Low);
        assert_eq!(profile.uv_risk.level, RiskLevel::Low);
        assert_eq!(profile.overall_level(), RiskLevel::Extreme);
    }

    #[test]
    fn test_notable_factors_sorted_by_severity() {
        let profile = analyze_risks(&climate(72.0, 65.0, 9.0, 120.0, 50.0));
        assert_eq!(
            profile.notable_factors(),
            vec![
                RiskFactor::Uv,
                RiskFactor::AirQuality,
                RiskFactor::Humidity,
                RiskFactor::Rain
            ]
        );
        assert!(profile.has_midday_hazard());
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Extreme);
        assert!(RiskLevel::High.is_elevated());
        assert!(!RiskLevel::Medium.is_elevated());
        assert_eq!(RiskLevel::Extreme.lowered(), RiskLevel::High);
        assert_eq!(RiskLevel::Low.lowered(), RiskLevel::Low);
    }

    #[test]
    fn test_profile_json_shape() {
        let profile = analyze_risks(&ClimateData::CURRENT_FALLBACK);
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["humidityDiscomfort"]["name"], "Humidity Comfort");
        assert_eq!(value["aqiRisk"]["level"], "Low");
        assert_eq!(value["uvRisk"]["level"], "Medium");
    }
}
