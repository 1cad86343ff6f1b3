//! Integration tests for the Open-Meteo client and the HTTP API

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::{Value, json};
use stepsafe::advisory::AdvisoryGenerator;
use stepsafe::config::{AdvisoryConfig, ClimateConfig};
use stepsafe::{
    AppState, ClimateData, ClimateProvider, ClimateService, ExposureStore, FallbackAdvisor,
    LlmAdvisor, Location, OpenMeteoProvider, PersistentCache, RuleBasedAdvisor,
    SyntheticProvider, analyze_risks, web,
};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_provider(server: &MockServer) -> OpenMeteoProvider {
    let config = ClimateConfig {
        forecast_url: format!("{}/v1/forecast", server.uri()),
        air_quality_url: format!("{}/v1/air-quality", server.uri()),
        archive_url: format!("{}/v1/archive", server.uri()),
        geocoding_url: format!("{}/v1/search", server.uri()),
        ..ClimateConfig::default()
    };
    let client = stepsafe::build_http_client(Duration::from_secs(5), 0).unwrap();
    OpenMeteoProvider::new(client, &config)
}

fn phoenix() -> Location {
    Location::new(33.45, -112.07, "Phoenix".to_string())
}

async fn mount_current(server: &MockServer, rain: f64) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "33.45"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {
                "temperature_2m": 104.6,
                "relative_humidity_2m": 18.2,
                "rain": rain,
                "uv_index": 9.45
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .and(query_param("current", "us_aqi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": { "us_aqi": 87.4 }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_open_meteo_current_conditions() {
    let server = MockServer::start().await;
    mount_current(&server, 0.4).await;

    let climate = mock_provider(&server).current(&phoenix()).await.unwrap();

    assert_eq!(
        climate,
        ClimateData {
            temperature: 105.0,
            humidity: 18.0,
            uv_index: 9.0,
            aqi: 87.0,
            rain_probability: 100.0,
        }
    );
}

#[tokio::test]
async fn test_open_meteo_dry_weather_has_no_rain_chance() {
    let server = MockServer::start().await;
    mount_current(&server, 0.0).await;

    let climate = mock_provider(&server).current(&phoenix()).await.unwrap();
    assert_eq!(climate.rain_probability, 0.0);
}

#[tokio::test]
async fn test_open_meteo_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = mock_provider(&server).current(&phoenix()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_climate_service_falls_back_when_provider_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(PersistentCache::open(dir.path()).unwrap());
    let service = ClimateService::new(
        Arc::new(mock_provider(&server)),
        cache,
        Duration::from_secs(600),
    );

    assert_eq!(service.current(&phoenix()).await, ClimateData::CURRENT_FALLBACK);
    let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    assert_eq!(
        service.yesterday_on(&phoenix(), date).await,
        ClimateData::YESTERDAY_FALLBACK
    );
}

#[tokio::test]
async fn test_climate_service_caches_successful_fetches() {
    let server = MockServer::start().await;
    mount_current(&server, 0.0).await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(PersistentCache::open(dir.path()).unwrap());
    let service = ClimateService::new(
        Arc::new(mock_provider(&server)),
        cache,
        Duration::from_secs(600),
    );

    let first = service.current(&phoenix()).await;
    server.reset().await;
    let second = service.current(&phoenix()).await;

    assert_eq!(first.temperature, 105.0);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_synthetic_readings_never_served_as_open_meteo() {
    let server = MockServer::start().await;
    mount_current(&server, 0.0).await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(PersistentCache::open(dir.path()).unwrap());
    let ttl = Duration::from_secs(600);
    let synthetic = ClimateService::new(Arc::new(SyntheticProvider::new()), cache.clone(), ttl);
    let open_meteo = ClimateService::new(Arc::new(mock_provider(&server)), cache, ttl);
    let location = Location::from_coordinates(33.45, -112.07);

    let fake = synthetic.current(&location).await;
    let real = open_meteo.current(&location).await;

    assert_ne!(fake, real);
    assert_eq!(real.temperature, 105.0);
    assert_eq!(real.aqi, 87.0);
}

#[tokio::test]
async fn test_open_meteo_archive_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .and(query_param("start_date", "2024-07-01"))
        .and(query_param("end_date", "2024-07-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "daily": {
                "time": ["2024-07-01"],
                "temperature_2m_max": [101.3],
                "relative_humidity_2m_mean": [22.8],
                "uv_index_max": [10.1]
            }
        })))
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let climate = mock_provider(&server)
        .yesterday(&phoenix(), date)
        .await
        .unwrap();

    assert_eq!(climate.temperature, 101.0);
    assert_eq!(climate.humidity, 23.0);
    assert_eq!(climate.uv_index, 10.0);
    assert_eq!(climate.aqi, 70.0);
    assert_eq!(climate.rain_probability, 0.0);
}

#[tokio::test]
async fn test_open_meteo_archive_missing_values_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "daily": { "temperature_2m_max": [null] }
        })))
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    assert!(mock_provider(&server).yesterday(&phoenix(), date).await.is_err());
}

#[tokio::test]
async fn test_open_meteo_geocoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Lagos"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"name": "Lagos", "latitude": 6.45, "longitude": 3.39, "country": "Nigeria", "admin1": "Lagos"},
                {"name": "Lagos", "latitude": 37.1, "longitude": -8.67, "country": "Portugal", "admin1": "Faro"}
            ]
        })))
        .mount(&server)
        .await;

    let locations = mock_provider(&server).geocode("Lagos").await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].name, "Lagos");
    assert_eq!(locations[0].country.as_deref(), Some("Nigeria"));
    assert_eq!(locations[1].name, "Lagos, Faro");
}

#[tokio::test]
async fn test_open_meteo_geocoding_without_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let locations = mock_provider(&server).geocode("Nowhere").await.unwrap();
    assert!(locations.is_empty());
}

fn llm_advisor(server: &MockServer) -> LlmAdvisor {
    let config = AdvisoryConfig {
        base_url: server.uri(),
        ..AdvisoryConfig::default()
    };
    let client = stepsafe::build_http_client(Duration::from_secs(5), 0).unwrap();
    LlmAdvisor::new(client, &config, "test-api-key")
}

fn hot_day() -> ClimateData {
    ClimateData {
        temperature: 101.0,
        humidity: 30.0,
        uv_index: 10.0,
        aqi: 120.0,
        rain_probability: 0.0,
    }
}

#[tokio::test]
async fn test_llm_advisory_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {"content": {"parts": [{"text": "  Stay hydrated and avoid the midday sun.\n"}]}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = llm_advisor(&server)
        .generate(&analyze_risks(&hot_day()))
        .await
        .unwrap();
    assert_eq!(text, "Stay hydrated and avoid the midday sun.");
}

#[tokio::test]
async fn test_llm_failure_falls_back_to_rules() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let risks = analyze_risks(&hot_day());
    let advisor = FallbackAdvisor::new(Box::new(llm_advisor(&server)));

    let text = advisor.generate(&risks).await.unwrap();
    assert_eq!(text, RuleBasedAdvisor.advise(&risks));
}

/// Router over the synthetic provider with its cache in a temporary directory
fn synthetic_app() -> (axum::Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(PersistentCache::open(dir.path()).unwrap());
    let history = Arc::new(ExposureStore::open(&cache).unwrap());
    let climate = Arc::new(ClimateService::new(
        Arc::new(SyntheticProvider::new()),
        cache,
        Duration::from_secs(600),
    ));
    let advisor: Arc<dyn AdvisoryGenerator> = Arc::new(RuleBasedAdvisor);
    let state = Arc::new(AppState::new(climate, advisor, history));
    (web::app(state, Duration::from_secs(30)), dir)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn profile_json() -> Value {
    json!({
        "id": "user-42",
        "location": { "city": "Phoenix", "lat": 33.45, "lon": -112.07 },
        "routine": {
            "morningCommuteStart": "07:30",
            "workHoursStart": "09:00",
            "eveningCommuteStart": "17:30"
        },
        "commuteType": "Walk",
        "sensitivities": { "heat": "High", "aqi": "Yes" },
        "healthProfile": { "ageRange": "65+", "skinType": "Fair" }
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = synthetic_app();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], stepsafe::VERSION);
}

#[tokio::test]
async fn test_risks_endpoint_classifies_snapshot() {
    let (app, _dir) = synthetic_app();
    let climate = json!({
        "temperature": 72.0,
        "humidity": 45.0,
        "uvIndex": 11.0,
        "aqi": 250.0,
        "rainProbability": 80.0
    });

    let (status, body) = send(&app, post_json("/api/risks", &climate)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uvRisk"]["level"], "Extreme");
    assert_eq!(body["aqiRisk"]["level"], "Extreme");
    assert_eq!(body["humidityDiscomfort"]["level"], "Low");
    assert_eq!(body["rainExposure"]["level"], "High");
}

#[tokio::test]
async fn test_risks_endpoint_rejects_malformed_body() {
    let (app, _dir) = synthetic_app();
    let (status, body) = send(&app, post_json("/api/risks", &json!({"temperature": "hot"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_check_by_city() {
    let (app, _dir) = synthetic_app();
    let (status, body) = send(&app, post_json("/api/check", &json!({"city": "Ab"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["name"], "Ab");
    // "Ab" hashes to 163
    assert_eq!(body["climate"]["temperature"], 93.0);
    assert_eq!(body["climate"]["aqi"], 173.0);
    assert_eq!(body["climate"]["rainProbability"], 63.0);
    assert!(!body["checklist"].as_array().unwrap().is_empty());
    assert!(!body["timeWindows"].as_array().unwrap().is_empty());
    assert!(!body["advisory"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_by_coordinates() {
    let (app, _dir) = synthetic_app();
    let (status, body) =
        send(&app, post_json("/api/check", &json!({"lat": 6.45, "lon": 3.39}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["latitude"], 6.45);
    assert_eq!(body["location"]["longitude"], 3.39);
}

#[tokio::test]
async fn test_check_rejects_bad_locations() {
    let (app, _dir) = synthetic_app();

    let (status, _) = send(&app, post_json("/api/check", &json!({"lat": 95.0, "lon": 0.0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post_json("/api/check", &json!({"city": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_is_recorded_in_history() {
    let (app, _dir) = synthetic_app();

    let (status, report) = send(&app, post_json("/api/report", &profile_json())).await;
    assert_eq!(status, StatusCode::OK);

    let score = report["dailySummary"]["personalHealthRiskScore"].as_u64().unwrap();
    assert!(score <= 100);
    assert_eq!(report["dailyGuidance"]["phases"].as_array().unwrap().len(), 3);
    assert!(!report["safetyAdvisory"]["advisory"].as_str().unwrap().is_empty());

    let request = Request::builder()
        .uri("/api/history/user-42")
        .body(Body::empty())
        .unwrap();
    let (status, history) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["personalHealthRiskScore"].as_u64(), Some(score));
}

#[tokio::test]
async fn test_report_rejects_invalid_profile() {
    let (app, _dir) = synthetic_app();
    let mut profile = profile_json();
    profile["routine"]["workHoursStart"] = json!("06:00");

    let (status, body) = send(&app, post_json("/api/report", &profile)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Routine"));
}

#[tokio::test]
async fn test_history_for_unknown_user_is_empty() {
    let (app, _dir) = synthetic_app();
    let request = Request::builder()
        .uri("/api/history/nobody")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
