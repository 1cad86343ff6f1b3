//! Daily health report and exposure history models

use super::profile::hhmm;
use crate::risk::RiskLevel;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Personalized report for one user and day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyHealthReport {
    pub daily_summary: DailySummary,
    pub safety_advisory: SafetyAdvisory,
    pub daily_guidance: DailyGuidance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// 0-100, higher is riskier
    pub personal_health_risk_score: u8,
    pub risk_description: RiskDescription,
    pub quick_insight: String,
    pub what_changed: WhatChanged,
    pub safe_windows: Vec<SafeWindow>,
}

/// Difference between today and yesterday
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhatChanged {
    /// °F
    pub temp_change: f64,
    pub aqi_change: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SafeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub is_safe: bool,
}

/// Banded reading of the personal health risk score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskDescription {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskDescription {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            76.. => RiskDescription::High,
            51..=75 => RiskDescription::Elevated,
            26..=50 => RiskDescription::Moderate,
            _ => RiskDescription::Low,
        }
    }
}

impl fmt::Display for RiskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskDescription::Low => "Low",
            RiskDescription::Moderate => "Moderate",
            RiskDescription::Elevated => "Elevated",
            RiskDescription::High => "High",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyAdvisory {
    pub advisory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyGuidance {
    pub phases: Vec<PhaseGuidance>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifePhase {
    #[serde(rename = "Morning Commute")]
    MorningCommute,
    #[serde(rename = "Work Hours")]
    WorkHours,
    #[serde(rename = "Evening Commute")]
    EveningCommute,
}

impl LifePhase {
    /// Commute phases are spent in transit rather than at work
    #[must_use]
    pub fn is_commute(self) -> bool {
        !matches!(self, LifePhase::WorkHours)
    }
}

impl fmt::Display for LifePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifePhase::MorningCommute => "Morning Commute",
            LifePhase::WorkHours => "Work Hours",
            LifePhase::EveningCommute => "Evening Commute",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseGuidance {
    pub phase: LifePhase,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub risks: PhaseRisks,
    pub summary: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRisks {
    pub heat_risk: RiskLevel,
    pub uv_risk: RiskLevel,
    pub aqi_risk: RiskLevel,
    pub rain_exposure: RiskLevel,
}

impl PhaseRisks {
    #[must_use]
    pub fn highest(&self) -> RiskLevel {
        self.heat_risk
            .max(self.uv_risk)
            .max(self.aqi_risk)
            .max(self.rain_exposure)
    }
}

/// One day of a user's exposure history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExposureRecord {
    pub date: NaiveDate,
    pub personal_health_risk_score: u8,
    /// °F
    pub max_heat: f64,
    pub max_aqi: f64,
    pub max_uv: f64,
}
