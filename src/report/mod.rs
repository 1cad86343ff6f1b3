//! Daily health report
//!
//! [`build_report`] is pure: profile plus today's and yesterday's snapshots in,
//! report out. [`ReportService`] wires it to the climate service, the advisory
//! generator and the exposure history.

pub mod guidance;
pub mod score;

use crate::advisory::{AdvisoryGenerator, join_phrases};
use crate::climate::ClimateService;
use crate::history::ExposureStore;
use crate::location_resolver::LocationResolver;
use crate::models::{
    ClimateData, DailyHealthReport, DailySummary, ExposureRecord, RiskDescription, SafeWindow,
    SafetyAdvisory, UserProfile, WhatChanged,
};
use crate::risk::{RiskLevel, RiskProfile, analyze_risks};
use crate::Result;
use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub use guidance::daily_guidance;
pub use score::personal_health_risk_score;

/// Score above which the midday window is unsafe regardless of heat and UV
const MIDDAY_SCORE_LIMIT: u8 = 50;

#[must_use]
pub fn what_changed(today: &ClimateData, yesterday: &ClimateData) -> WhatChanged {
    WhatChanged {
        temp_change: today.temperature - yesterday.temperature,
        aqi_change: today.aqi - yesterday.aqi,
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Four contiguous windows covering the day; only 12:00-16:00 can be unsafe
#[must_use]
pub fn safe_windows(risks: &RiskProfile, score: u8) -> Vec<SafeWindow> {
    let midday_safe = !(risks.has_midday_hazard() || score > MIDDAY_SCORE_LIMIT);
    let bounds = [
        (hm(0, 0), hm(7, 0), true),
        (hm(7, 0), hm(12, 0), true),
        (hm(12, 0), hm(16, 0), midday_safe),
        (hm(16, 0), hm(23, 59), true),
    ];
    bounds
        .into_iter()
        .map(|(start, end, is_safe)| SafeWindow {
            start,
            end,
            is_safe,
        })
        .collect()
}

fn level_adjective(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "moderate",
        RiskLevel::High => "high",
        RiskLevel::Extreme => "extreme",
    }
}

/// One sentence naming the risk band and up to two main drivers
#[must_use]
pub fn quick_insight(description: RiskDescription, risks: &RiskProfile) -> String {
    let band = description.to_string().to_lowercase();
    let drivers: Vec<String> = risks
        .notable_factors()
        .into_iter()
        .take(2)
        .map(|factor| format!("{} {}", level_adjective(risks.level(factor)), factor.phrase()))
        .collect();

    if drivers.is_empty() {
        return format!("Your personal health risk is {band} today, with calm conditions all day.");
    }

    let drivers: Vec<&str> = drivers.iter().map(String::as_str).collect();
    format!(
        "Your personal health risk is {band} today, mainly due to {}.",
        join_phrases(&drivers)
    )
}

/// Assemble the report from already fetched inputs
#[must_use]
pub fn build_report(
    profile: &UserProfile,
    today: &ClimateData,
    yesterday: &ClimateData,
    advisory: String,
) -> DailyHealthReport {
    let risks = analyze_risks(today);
    build_report_with_risks(profile, &risks, today, yesterday, advisory)
}

fn build_report_with_risks(
    profile: &UserProfile,
    risks: &RiskProfile,
    today: &ClimateData,
    yesterday: &ClimateData,
    advisory: String,
) -> DailyHealthReport {
    let score = personal_health_risk_score(profile, risks);
    let description = RiskDescription::from_score(score);

    DailyHealthReport {
        daily_summary: DailySummary {
            personal_health_risk_score: score,
            risk_description: description,
            quick_insight: quick_insight(description, risks),
            what_changed: what_changed(today, yesterday),
            safe_windows: safe_windows(risks, score),
        },
        safety_advisory: SafetyAdvisory { advisory },
        daily_guidance: daily_guidance(profile, risks),
    }
}

/// History entry for a finished report
#[must_use]
pub fn exposure_record(
    date: NaiveDate,
    report: &DailyHealthReport,
    today: &ClimateData,
) -> ExposureRecord {
    ExposureRecord {
        date,
        personal_health_risk_score: report.daily_summary.personal_health_risk_score,
        max_heat: today.temperature,
        max_aqi: today.aqi,
        max_uv: today.uv_index,
    }
}

pub struct ReportService {
    climate: Arc<ClimateService>,
    advisor: Arc<dyn AdvisoryGenerator>,
    history: Arc<ExposureStore>,
}

impl ReportService {
    pub fn new(
        climate: Arc<ClimateService>,
        advisor: Arc<dyn AdvisoryGenerator>,
        history: Arc<ExposureStore>,
    ) -> Self {
        Self {
            climate,
            advisor,
            history,
        }
    }

    /// Fetch, score and record today's report for a profile
    #[instrument(skip(self, profile), fields(user = %profile.id))]
    pub async fn generate(&self, profile: &UserProfile) -> Result<DailyHealthReport> {
        profile.validate()?;
        let location = LocationResolver::resolve_profile(self.climate.provider(), profile).await?;

        let (today, yesterday) = tokio::join!(
            self.climate.current(&location),
            self.climate.yesterday(&location)
        );

        let risks = analyze_risks(&today);
        let advisory = self.advisor.generate(&risks).await?;
        let report = build_report_with_risks(profile, &risks, &today, &yesterday, advisory);

        let record = exposure_record(Utc::now().date_naive(), &report, &today);
        // the report is still useful when history cannot be written
        if let Err(e) = self.history.append(&profile.id, record).await {
            warn!("Failed to store exposure record: {e}");
        }

        info!(
            score = report.daily_summary.personal_health_risk_score,
            "Generated daily health report for {}", location.name
        );
        Ok(report)
    }
}
