//! Generative advisory through a `generateContent` style model endpoint

use super::AdvisoryGenerator;
use crate::config::AdvisoryConfig;
use crate::risk::RiskProfile;
use crate::{Result, StepSafeError};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding one-minute request budget
#[derive(Debug)]
pub struct RateLimiter {
    max_requests_per_minute: u32,
    request_times: Vec<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute,
            request_times: Vec::new(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.forget_old_requests(Instant::now());

        if self.request_times.len() >= self.max_requests_per_minute as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self) -> Duration {
        self.forget_old_requests(Instant::now());

        if self.request_times.len() < self.max_requests_per_minute as usize {
            return Duration::ZERO;
        }
        self.request_times
            .first()
            .map(|oldest| WINDOW.saturating_sub(oldest.elapsed()))
            .unwrap_or(Duration::ZERO)
    }

    fn forget_old_requests(&mut self, now: Instant) {
        self.request_times
            .retain(|&time| now.duration_since(time) < WINDOW);
    }
}

pub struct LlmAdvisor {
    client: ClientWithMiddleware,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    limiter: Mutex<RateLimiter>,
}

impl LlmAdvisor {
    pub fn new(client: ClientWithMiddleware, config: &AdvisoryConfig, api_key: &str) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(u64::from(config.timeout_seconds)),
            limiter: Mutex::new(RateLimiter::new(config.max_requests_per_minute)),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Instructions plus the five levels, one per line
#[must_use]
pub fn build_prompt(profile: &RiskProfile) -> String {
    format!(
        "You are a public health safety advisor. You will receive risk levels for different \
climate factors and must summarize the overall risk with clear, professional, non-alarming advice.\n\
\n\
Heat Risk: {}\n\
UV Risk: {}\n\
AQI Risk: {}\n\
Humidity Discomfort: {}\n\
Rain Exposure: {}\n\
\n\
Write a short advisory paragraph (3-4 lines) summarizing the risks and recommending precautions. \
Be professional, clear and reassuring. Reply with the paragraph only.",
        profile.heat_risk.level,
        profile.uv_risk.level,
        profile.aqi_risk.level,
        profile.humidity_discomfort.level,
        profile.rain_exposure.level,
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[async_trait]
impl AdvisoryGenerator for LlmAdvisor {
    #[instrument(skip(self, profile))]
    async fn generate(&self, profile: &RiskProfile) -> Result<String> {
        {
            let mut limiter = self.limiter.lock().await;
            if !limiter.allow_request() {
                let wait = limiter.time_until_next_request();
                return Err(StepSafeError::llm(format!(
                    "Rate limit reached, next request allowed in {}s",
                    wait.as_secs()
                )));
            }
        }

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(profile),
                }],
            }],
        };

        debug!("Calling the advisory model");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| StepSafeError::llm(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StepSafeError::llm(format!(
                "Model endpoint returned status {status}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StepSafeError::llm(format!("Failed to parse model response: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(StepSafeError::llm("Model returned no text"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClimateData;
    use crate::risk::analyze_risks;

    #[test]
    fn test_rate_limiter() {
        let mut limiter = RateLimiter::new(2);

        assert!(limiter.allow_request());
        assert!(limiter.allow_request());
        assert!(!limiter.allow_request());

        let wait_time = limiter.time_until_next_request();
        assert!(wait_time > Duration::ZERO);
        assert!(wait_time <= WINDOW);
    }

    #[test]
    fn test_prompt_lists_levels() {
        let profile = analyze_risks(&ClimateData {
            uv_index: 9.0,
            ..ClimateData::CURRENT_FALLBACK
        });
        let prompt = build_prompt(&profile);
        assert!(prompt.contains("UV Risk: Extreme"));
        assert!(prompt.contains("Heat Risk: Low"));
        assert!(prompt.contains("Rain Exposure: Low"));
    }

    #[test]
    fn test_endpoint_from_config() {
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build();
        let config = AdvisoryConfig {
            base_url: "http://localhost:9999/v1beta/".to_string(),
            ..AdvisoryConfig::default()
        };
        let advisor = LlmAdvisor::new(client, &config, "test-key-123");
        assert_eq!(
            advisor.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Take care."}],"role":"model"}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let content = parsed.candidates.into_iter().next().unwrap().content.unwrap();
        assert_eq!(content.parts[0].text, "Take care.");
    }
}
