//! Natural-language safety advisories
//!
//! Two generators implement [`AdvisoryGenerator`]: deterministic rule-based
//! text and a hosted generative model. [`FallbackAdvisor`] pairs them so an
//! advisory is always produced.

pub mod llm;
pub mod rules;

use crate::Result;
use crate::config::AdvisoryConfig;
use crate::risk::RiskProfile;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use tracing::warn;

pub use llm::{LlmAdvisor, RateLimiter};
pub use rules::RuleBasedAdvisor;

#[async_trait]
pub trait AdvisoryGenerator: Send + Sync {
    /// A short paragraph summarizing the risks and the top precautions
    async fn generate(&self, profile: &RiskProfile) -> Result<String>;
}

/// Tries the primary generator and answers with rule-based text when it fails
pub struct FallbackAdvisor {
    primary: Box<dyn AdvisoryGenerator>,
    fallback: RuleBasedAdvisor,
}

impl FallbackAdvisor {
    pub fn new(primary: Box<dyn AdvisoryGenerator>) -> Self {
        Self {
            primary,
            fallback: RuleBasedAdvisor,
        }
    }
}

#[async_trait]
impl AdvisoryGenerator for FallbackAdvisor {
    async fn generate(&self, profile: &RiskProfile) -> Result<String> {
        match self.primary.generate(profile).await {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => {
                warn!("Advisory model returned empty text, using rule-based advisory");
                Ok(self.fallback.advise(profile))
            }
            Err(e) => {
                warn!("Advisory model failed, using rule-based advisory: {e}");
                Ok(self.fallback.advise(profile))
            }
        }
    }
}

/// Advisory generator selected by `advisory.mode`
#[must_use]
pub fn from_config(
    config: &AdvisoryConfig,
    client: ClientWithMiddleware,
) -> Arc<dyn AdvisoryGenerator> {
    match (config.mode.as_str(), config.api_key.as_deref()) {
        ("llm", Some(api_key)) => Arc::new(FallbackAdvisor::new(Box::new(LlmAdvisor::new(
            client, config, api_key,
        )))),
        _ => Arc::new(RuleBasedAdvisor),
    }
}

/// "a", "a and b", "a, b and c"
pub(crate) fn join_phrases(phrases: &[&str]) -> String {
    match phrases {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
