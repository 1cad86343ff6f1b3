//! Data models for the `StepSafe` service
//!
//! - Location: geographic coordinates and metadata
//! - Climate: point-in-time weather and air-quality snapshot
//! - Profile: user profile and quick-check input
//! - Report: daily health report and exposure history records

pub mod climate;
pub mod location;
pub mod profile;
pub mod report;

pub use climate::ClimateData;
pub use location::Location;
pub use profile::{
    ActivityLevel, AgeGroup, AgeRange, AqiSensitivity, CommuteType, HealthProfile,
    ProfileLocation, RespiratoryHealth, Routine, SensitivityLevel, Sensitivities, SkinType,
    UserInput, UserProfile,
};
pub use report::{
    DailyGuidance, DailyHealthReport, DailySummary, ExposureRecord, LifePhase, PhaseGuidance,
    PhaseRisks, RiskDescription, SafeWindow, SafetyAdvisory, WhatChanged,
};
