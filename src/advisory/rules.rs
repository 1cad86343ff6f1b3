use super::{AdvisoryGenerator, join_phrases};
use crate::Result;
use crate::risk::{RiskFactor, RiskLevel, RiskProfile};
use async_trait::async_trait;

/// Deterministic advisory text built from the risk levels alone
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedAdvisor;

fn precaution(factor: RiskFactor) -> &'static str {
    match factor {
        RiskFactor::Heat => "drink water regularly and take breaks in the shade",
        RiskFactor::Uv => "wear SPF 30+ sunscreen and a hat",
        RiskFactor::AirQuality => {
            "limit strenuous outdoor exercise and consider a well-fitted mask"
        }
        RiskFactor::Humidity => "pace yourself, since the air will feel warmer than it is",
        RiskFactor::Rain => "keep an umbrella or raincoat close",
    }
}

fn severity_word(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "moderate",
        RiskLevel::High => "high",
        RiskLevel::Extreme => "very high",
    }
}

impl RuleBasedAdvisor {
    /// Three or four sentences naming the notable factors and what to do about them
    #[must_use]
    pub fn advise(&self, profile: &RiskProfile) -> String {
        let notable = profile.notable_factors();
        if notable.is_empty() {
            return "Conditions are favourable today, with low risk across every climate factor. \
                    Enjoy your time outdoors and keep to your usual hydration. \
                    No special precautions are needed."
                .to_string();
        }

        let phrases: Vec<&str> = notable.iter().map(|factor| factor.phrase()).collect();
        let mut sentences = vec![format!(
            "Overall risk today is {}, driven mainly by {}.",
            severity_word(profile.overall_level()),
            join_phrases(&phrases)
        )];

        let precautions: Vec<&str> = notable.iter().take(2).map(|f| precaution(*f)).collect();
        sentences.push(format!(
            "To stay comfortable, {}.",
            join_phrases(&precautions)
        ));

        if profile.has_midday_hazard() {
            sentences.push(
                "Plan time outside before 11:00 AM or after 4:00 PM, when heat and UV ease off."
                    .to_string(),
            );
        }

        sentences.push(if profile.overall_level() >= RiskLevel::High {
            "Check on vulnerable family members and neighbours, and adjust plans if you feel unwell."
                .to_string()
        } else {
            "With these simple steps, outdoor plans can go ahead as usual.".to_string()
        });

        sentences.join(" ")
    }
}

#[async_trait]
impl AdvisoryGenerator for RuleBasedAdvisor {
    async fn generate(&self, profile: &RiskProfile) -> Result<String> {
        Ok(self.advise(profile))
    }
}
