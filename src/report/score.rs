//! Personal health risk score

use crate::models::{
    AgeRange, AqiSensitivity, RespiratoryHealth, SensitivityLevel, SkinType, UserProfile,
};
use crate::risk::{RiskFactor, RiskProfile};

/// Share of the score each factor contributes at equal levels
fn weight(factor: RiskFactor) -> f64 {
    match factor {
        RiskFactor::Heat => 0.30,
        RiskFactor::Uv => 0.20,
        RiskFactor::AirQuality => 0.25,
        RiskFactor::Humidity => 0.10,
        RiskFactor::Rain => 0.15,
    }
}

/// How strongly this user reacts to a factor, 1.0 being the baseline
fn sensitivity_multiplier(profile: &UserProfile, factor: RiskFactor) -> f64 {
    let health = profile.health_profile.unwrap_or_default();
    let mut multiplier = 1.0;

    match factor {
        RiskFactor::Heat => {
            multiplier *= match profile.sensitivities.heat {
                SensitivityLevel::High => 1.5,
                SensitivityLevel::Medium => 1.2,
                SensitivityLevel::Low => 1.0,
            };
            if health.age_range == Some(AgeRange::Over65) {
                multiplier *= 1.1;
            }
        }
        RiskFactor::AirQuality => {
            if profile.sensitivities.aqi == AqiSensitivity::Yes {
                multiplier *= 1.5;
            }
            if health.respiratory_health == Some(RespiratoryHealth::Sensitive) {
                multiplier *= 1.3;
            }
        }
        RiskFactor::Uv => {
            if matches!(health.skin_type, Some(SkinType::VeryFair | SkinType::Fair)) {
                multiplier *= 1.3;
            }
        }
        RiskFactor::Humidity | RiskFactor::Rain => {}
    }

    if profile.commute_type.is_exposed() {
        multiplier *= 1.1;
    }

    multiplier
}

/// 0-100. Every factor at Extreme with no sensitivities scores 100; sensitivities
/// push the score up and the result is clamped.
#[must_use]
pub fn personal_health_risk_score(profile: &UserProfile, risks: &RiskProfile) -> u8 {
    let max_points = 3.0;
    let weighted: f64 = RiskFactor::ALL
        .iter()
        .map(|factor| {
            let points = f64::from(risks.level(*factor).points());
            weight(*factor) * points * sensitivity_multiplier(profile, *factor)
        })
        .sum();

    (weighted / max_points * 100.0).round().clamp(0.0, 100.0) as u8
}
