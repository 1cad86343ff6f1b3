//! `StepSafe` - personal climate-health advisories
//!
//! This library turns weather and air-quality readings into per-factor risk
//! levels, a preparation checklist, time-of-day guidance, a personal daily
//! health report and a local exposure history.

pub mod advisory;
pub mod api;
pub mod cache;
pub mod climate;
pub mod config;
pub mod error;
pub mod history;
pub mod location_resolver;
pub mod models;
pub mod report;
pub mod risk;
pub mod telemetry;
pub mod web;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

// Re-export core types for public API
pub use advisory::{AdvisoryGenerator, FallbackAdvisor, LlmAdvisor, RuleBasedAdvisor};
pub use api::AppState;
pub use cache::PersistentCache;
pub use climate::{ClimateProvider, ClimateService, OpenMeteoProvider, SyntheticProvider};
pub use config::StepSafeConfig;
pub use error::StepSafeError;
pub use history::ExposureStore;
pub use location_resolver::{LocationInput, LocationParser, LocationResolver};
pub use models::{ClimateData, DailyHealthReport, ExposureRecord, Location, UserInput, UserProfile};
pub use report::ReportService;
pub use risk::{
    ChecklistItem, Risk, RiskLevel, RiskProfile, TimeWindow, analyze_risks, generate_checklist,
    generate_time_windows,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, StepSafeError>;

/// Shared HTTP client that retries transient failures with exponential backoff
pub fn build_http_client(
    timeout: Duration,
    max_retries: u32,
) -> anyhow::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("stepsafe/{VERSION}"))
        .build()?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
