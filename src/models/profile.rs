//! User profile and quick-check input models

use crate::StepSafeError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored profile driving the daily health report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub location: ProfileLocation,
    pub routine: Routine,
    pub commute_type: CommuteType,
    pub sensitivities: Sensitivities,
    #[serde(default)]
    pub health_profile: Option<HealthProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileLocation {
    pub city: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Daily routine anchors, serialized as `HH:MM`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    #[serde(with = "hhmm")]
    pub morning_commute_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub work_hours_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub evening_commute_start: NaiveTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommuteType {
    Walk,
    #[serde(rename = "Public Transport")]
    PublicTransport,
    Bike,
    Drive,
}

impl CommuteType {
    /// Commutes spent outdoors without shelter
    #[must_use]
    pub fn is_exposed(self) -> bool {
        matches!(self, CommuteType::Walk | CommuteType::Bike)
    }
}

impl fmt::Display for CommuteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommuteType::Walk => "Walk",
            CommuteType::PublicTransport => "Public Transport",
            CommuteType::Bike => "Bike",
            CommuteType::Drive => "Drive",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sensitivities {
    pub heat: SensitivityLevel,
    pub aqi: AqiSensitivity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum SensitivityLevel {
    Low,
    Medium,
    High,
}

/// Older profiles stored AQI sensitivity as Low/Medium/High
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AqiSensitivity {
    #[serde(alias = "Medium", alias = "High")]
    Yes,
    #[serde(alias = "Low")]
    No,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    #[serde(default)]
    pub age_range: Option<AgeRange>,
    #[serde(default)]
    pub skin_type: Option<SkinType>,
    #[serde(default)]
    pub respiratory_health: Option<RespiratoryHealth>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgeRange {
    #[serde(rename = "18-29")]
    From18To29,
    #[serde(rename = "30-49")]
    From30To49,
    #[serde(rename = "50-64")]
    From50To64,
    #[serde(rename = "65+")]
    Over65,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkinType {
    #[serde(rename = "Very Fair")]
    VeryFair,
    Fair,
    Medium,
    Olive,
    Brown,
    Black,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RespiratoryHealth {
    Good,
    Moderate,
    Sensitive,
}

/// Input of the quick risk check wizard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub city: String,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgeGroup {
    Child,
    Adult,
    Elderly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl UserProfile {
    /// Reject profiles that cannot produce a report
    pub fn validate(&self) -> Result<(), StepSafeError> {
        if self.id.trim().is_empty() {
            return Err(StepSafeError::validation("Profile id cannot be empty"));
        }

        if self.location.city.trim().is_empty() && self.coordinates().is_none() {
            return Err(StepSafeError::validation(
                "Profile needs a city or a non-zero lat and lon",
            ));
        }

        if let Some(lat) = self.location.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(StepSafeError::validation(format!(
                    "Latitude must be between -90 and 90, got: {lat}"
                )));
            }
        }
        if let Some(lon) = self.location.lon {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(StepSafeError::validation(format!(
                    "Longitude must be between -180 and 180, got: {lon}"
                )));
            }
        }

        let routine = &self.routine;
        if routine.morning_commute_start > routine.work_hours_start
            || routine.work_hours_start > routine.evening_commute_start
        {
            return Err(StepSafeError::validation(
                "Routine times must run morning commute, then work hours, then evening commute",
            ));
        }

        Ok(())
    }

    /// Known coordinates, if the profile carries both
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        // (0, 0) is what unfinished profiles store instead of a geocoded position
        match (self.location.lat, self.location.lon) {
            (Some(lat), Some(lon)) if !(lat == 0.0 && lon == 0.0) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// `HH:MM` serde adapter for [`NaiveTime`]
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid time '{raw}', expected HH:MM: {e}")))
    }
}
