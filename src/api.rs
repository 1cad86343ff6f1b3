//! JSON API served under `/api`

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, instrument};

use crate::{
    StepSafeConfig, StepSafeError, VERSION, advisory,
    advisory::AdvisoryGenerator,
    build_http_client,
    cache::PersistentCache,
    climate::ClimateService,
    history::ExposureStore,
    location_resolver::{LocationParser, LocationResolver},
    models::{ClimateData, DailyHealthReport, ExposureRecord, Location, UserInput, UserProfile},
    report::ReportService,
    risk::{
        ChecklistItem, RiskProfile, TimeWindow, analyze_risks, generate_checklist,
        generate_time_windows,
    },
};

/// Services shared by every request and by the CLI
pub struct AppState {
    pub climate: Arc<ClimateService>,
    pub advisor: Arc<dyn AdvisoryGenerator>,
    pub history: Arc<ExposureStore>,
    pub reports: ReportService,
}

/// Body of `POST /api/check`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CheckRequest {
    Coordinates { lat: f64, lon: f64 },
    City(UserInput),
}

/// Everything the quick check shows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub location: Location,
    pub climate: ClimateData,
    pub risk_profile: RiskProfile,
    pub checklist: Vec<ChecklistItem>,
    pub time_windows: Vec<TimeWindow>,
    pub advisory: String,
}

impl AppState {
    pub fn new(
        climate: Arc<ClimateService>,
        advisor: Arc<dyn AdvisoryGenerator>,
        history: Arc<ExposureStore>,
    ) -> Self {
        let reports = ReportService::new(climate.clone(), advisor.clone(), history.clone());
        Self {
            climate,
            advisor,
            history,
            reports,
        }
    }

    /// Open the cache at the configured location and build every service
    pub fn from_config(config: &StepSafeConfig) -> anyhow::Result<Self> {
        let cache = Arc::new(PersistentCache::open(config.cache_path())?);
        let history = Arc::new(ExposureStore::open(&cache)?);

        let client = build_http_client(
            Duration::from_secs(u64::from(config.climate.timeout_seconds)),
            config.climate.max_retries,
        )?;
        let climate = Arc::new(ClimateService::from_config(config, client.clone(), cache));
        let advisor = advisory::from_config(&config.advisory, client);

        Ok(Self::new(climate, advisor, history))
    }

    /// Resolve a location and run the full quick check against it
    #[instrument(skip(self))]
    pub async fn check(&self, request: CheckRequest) -> crate::Result<CheckResult> {
        let location = match request {
            CheckRequest::Coordinates { lat, lon } => {
                LocationParser::validate_coordinates(lat, lon)?;
                Location::from_coordinates(lat, lon)
            }
            CheckRequest::City(input) => {
                LocationResolver::resolve(self.climate.provider(), &input.city).await?
            }
        };

        let climate = self.climate.current(&location).await;
        let risk_profile = analyze_risks(&climate);
        let advisory = self.advisor.generate(&risk_profile).await?;

        Ok(CheckResult {
            location,
            climate,
            checklist: generate_checklist(&risk_profile),
            time_windows: generate_time_windows(&risk_profile),
            risk_profile,
            advisory,
        })
    }
}

/// Error body `{"error": ...}` with a status derived from the error kind
pub struct ApiError(StepSafeError);

impl From<StepSafeError> for ApiError {
    fn from(error: StepSafeError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(StepSafeError::validation(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            StepSafeError::Validation { .. } => StatusCode::BAD_REQUEST,
            StepSafeError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/check", post(check))
        .route("/risks", post(risks))
        .route("/report", post(report))
        .route("/history/{user_id}", get(history))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

async fn check(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResult>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.check(request).await?))
}

async fn risks(
    payload: Result<Json<ClimateData>, JsonRejection>,
) -> Result<Json<RiskProfile>, ApiError> {
    let Json(climate) = payload?;
    let values = [
        climate.temperature,
        climate.humidity,
        climate.uv_index,
        climate.aqi,
        climate.rain_probability,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StepSafeError::validation("Climate values must be finite numbers").into());
    }
    Ok(Json(analyze_risks(&climate)))
}

async fn report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserProfile>, JsonRejection>,
) -> Result<Json<DailyHealthReport>, ApiError> {
    let Json(profile) = payload?;
    Ok(Json(state.reports.generate(&profile).await?))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ExposureRecord>>, ApiError> {
    Ok(Json(state.history.list(&user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ApiError(StepSafeError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(StepSafeError::location_not_found("Atlantis")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(StepSafeError::cache("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_check_request_shapes() {
        let coords: CheckRequest = serde_json::from_str(r#"{"lat": 33.4, "lon": -112.0}"#).unwrap();
        assert!(matches!(coords, CheckRequest::Coordinates { .. }));

        let city: CheckRequest =
            serde_json::from_str(r#"{"city": "Lagos", "ageGroup": "Adult"}"#).unwrap();
        assert!(matches!(city, CheckRequest::City(UserInput { ref city, .. }) if city == "Lagos"));

        assert!(serde_json::from_str::<CheckRequest>(r#"{"town": "Lagos"}"#).is_err());
    }
}
