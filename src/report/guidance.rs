//! Life-phase guidance built from the user's routine

use crate::models::{
    CommuteType, DailyGuidance, LifePhase, PhaseGuidance, PhaseRisks, SensitivityLevel,
    UserProfile,
};
use crate::risk::{RiskLevel, RiskProfile};
use chrono::{NaiveTime, Timelike};

const MAX_RECOMMENDATIONS: usize = 4;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Peak heat and UV hours, 11:00-16:00
fn overlaps_midday(start: NaiveTime, end: NaiveTime) -> bool {
    start < hm(16, 0) && end > hm(11, 0)
}

/// Start of the following hour, or 23:59 for a start in the last hour of the day
#[must_use]
pub fn next_full_hour(time: NaiveTime) -> NaiveTime {
    match time.hour() {
        23 => hm(23, 59),
        hour => hm(hour + 1, 0),
    }
}

/// Risk levels as felt during one phase
#[must_use]
pub fn phase_risks(risks: &RiskProfile, start: NaiveTime, end: NaiveTime) -> PhaseRisks {
    if overlaps_midday(start, end) {
        PhaseRisks {
            heat_risk: risks.heat_risk.level,
            uv_risk: risks.uv_risk.level,
            aqi_risk: risks.aqi_risk.level,
            rain_exposure: risks.rain_exposure.level,
        }
    } else {
        // outside the peak, the sun is low and the day is cooler
        PhaseRisks {
            heat_risk: risks.heat_risk.level.lowered(),
            uv_risk: RiskLevel::Low,
            aqi_risk: risks.aqi_risk.level,
            rain_exposure: risks.rain_exposure.level,
        }
    }
}

fn dominant_concern(risks: &PhaseRisks) -> &'static str {
    let candidates = [
        (risks.heat_risk, "heat"),
        (risks.uv_risk, "UV"),
        (risks.aqi_risk, "air quality"),
        (risks.rain_exposure, "rain"),
    ];
    candidates
        .iter()
        .fold(candidates[0], |best, next| if next.0 > best.0 { *next } else { best })
        .1
}

fn phase_summary(phase: LifePhase, risks: &PhaseRisks) -> String {
    let highest = risks.highest();
    if highest == RiskLevel::Low {
        return match phase {
            LifePhase::WorkHours => {
                "Conditions stay comfortable through your working hours.".to_string()
            }
            _ => format!(
                "Your {} looks clear, with low risk across the board.",
                phase.to_string().to_lowercase()
            ),
        };
    }

    let concern = dominant_concern(risks);
    let level = highest.to_string().to_lowercase();
    match phase {
        LifePhase::MorningCommute => format!(
            "Your morning commute carries {level} {concern} risk. Prepare before you head out."
        ),
        LifePhase::WorkHours => format!(
            "Work hours span the peak of the day, with {level} {concern} risk. Plan any time outside carefully."
        ),
        LifePhase::EveningCommute => format!(
            "Your evening commute still carries {level} {concern} risk. Conditions ease as the day ends."
        ),
    }
}

fn commute_recommendations(
    commute: CommuteType,
    risks: &PhaseRisks,
    heat_sensitivity: SensitivityLevel,
) -> Vec<String> {
    let mut items = Vec::new();

    if risks.aqi_risk.is_elevated() {
        items.push(match commute {
            CommuteType::Walk | CommuteType::Bike => "Wear an N95/KN95 mask while you commute.",
            CommuteType::PublicTransport => "Wear a mask on platforms and at busy stops.",
            CommuteType::Drive => "Keep windows closed and set ventilation to recirculate.",
        });
    }

    if risks.heat_risk >= RiskLevel::Medium {
        items.push(match commute {
            CommuteType::Walk => "Walk on the shaded side of the street and slow your pace.",
            CommuteType::Bike => "Ride at an easy pace and carry a full water bottle.",
            CommuteType::PublicTransport => "Wait in shaded or covered stops and carry water.",
            CommuteType::Drive => "Pre-cool the car and never leave anyone waiting inside it.",
        });
        if heat_sensitivity == SensitivityLevel::High {
            items.push("You are sensitive to heat, so build in extra time to cool down.");
        }
    }

    if risks.uv_risk.is_elevated() && commute != CommuteType::Drive {
        items.push("Apply sunscreen before you head out.");
    }

    if risks.rain_exposure >= RiskLevel::Medium {
        items.push(match commute {
            CommuteType::Walk | CommuteType::PublicTransport => "Bring an umbrella or rain jacket.",
            CommuteType::Bike => "Pack waterproof gear and allow extra braking distance.",
            CommuteType::Drive => "Allow extra travel time for wet roads.",
        });
    }

    if items.len() < 2 {
        items.push(match commute {
            CommuteType::Walk | CommuteType::Bike => {
                "Enjoy the fresh air, and check the AQI before you leave."
            }
            CommuteType::PublicTransport => "Check service updates and the AQI before you leave.",
            CommuteType::Drive => "Make sure the car's cabin air filter is clean.",
        });
    }
    if items.len() < 2 {
        items.push("Carry a water bottle for the trip.");
    }

    items.into_iter().map(str::to_string).collect()
}

fn work_recommendations(risks: &PhaseRisks) -> Vec<String> {
    let mut items = vec!["Stay hydrated throughout the day."];

    if risks.uv_risk.is_elevated() {
        items.push("If you go out for lunch, stay in the shade and wear sunscreen.");
    }
    if risks.heat_risk.is_elevated() {
        items.push("Keep outdoor breaks short between 11:00 and 16:00.");
    }
    if risks.aqi_risk.is_elevated() {
        items.push("Keep windows closed and take your breaks indoors.");
    }
    if risks.rain_exposure >= RiskLevel::Medium {
        items.push("Keep an umbrella at work for the afternoon.");
    }
    if items.len() < 2 {
        items.push("A short walk outside during a break is a good idea today.");
    }

    items.into_iter().map(str::to_string).collect()
}

fn phase_guidance(
    phase: LifePhase,
    start: NaiveTime,
    end: NaiveTime,
    profile: &UserProfile,
    risks: &RiskProfile,
) -> PhaseGuidance {
    let levels = phase_risks(risks, start, end);
    let mut recommendations = if phase.is_commute() {
        commute_recommendations(profile.commute_type, &levels, profile.sensitivities.heat)
    } else {
        work_recommendations(&levels)
    };
    recommendations.truncate(MAX_RECOMMENDATIONS);

    PhaseGuidance {
        phase,
        start_time: start,
        end_time: end,
        risks: levels,
        summary: phase_summary(phase, &levels),
        recommendations,
    }
}

/// Morning commute, work hours and evening commute, in that order
#[must_use]
pub fn daily_guidance(profile: &UserProfile, risks: &RiskProfile) -> DailyGuidance {
    let routine = profile.routine;
    let evening_end = next_full_hour(routine.evening_commute_start);

    DailyGuidance {
        phases: vec![
            phase_guidance(
                LifePhase::MorningCommute,
                routine.morning_commute_start,
                routine.work_hours_start,
                profile,
                risks,
            ),
            phase_guidance(
                LifePhase::WorkHours,
                routine.work_hours_start,
                routine.evening_commute_start,
                profile,
                risks,
            ),
            phase_guidance(
                LifePhase::EveningCommute,
                routine.evening_commute_start,
                evening_end,
                profile,
                risks,
            ),
        ],
    }
}
