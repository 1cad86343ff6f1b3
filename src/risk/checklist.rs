//! Preparation checklist derived from a risk profile

use super::{RiskLevel, RiskProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistKind {
    Water,
    Clothing,
    Sunscreen,
    Rain,
    Mask,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub id: ChecklistKind,
    pub recommendation: String,
    pub details: String,
}

impl ChecklistItem {
    fn new(id: ChecklistKind, recommendation: &str, details: &str) -> Self {
        Self {
            id,
            recommendation: recommendation.to_string(),
            details: details.to_string(),
        }
    }
}

/// Items in fixed order: water, clothing, sunscreen, rain, mask.
/// Water and clothing are always present; the rest only when relevant.
#[must_use]
pub fn generate_checklist(profile: &RiskProfile) -> Vec<ChecklistItem> {
    let mut items = Vec::with_capacity(5);
    let hot = profile.heat_risk.level.is_elevated();

    items.push(if hot {
        ChecklistItem::new(
            ChecklistKind::Water,
            "Stay extra hydrated",
            "Drink at least 3-4 liters of water throughout the day.",
        )
    } else {
        ChecklistItem::new(
            ChecklistKind::Water,
            "Standard hydration",
            "Aim for 2 liters of water today.",
        )
    });

    items.push(if hot {
        ChecklistItem::new(
            ChecklistKind::Clothing,
            "Wear light, breathable clothing",
            "Choose loose-fitting, light-colored fabrics.",
        )
    } else {
        ChecklistItem::new(
            ChecklistKind::Clothing,
            "Dress for comfort",
            "Standard clothing is appropriate for today's temperature.",
        )
    });

    match profile.uv_risk.level {
        RiskLevel::High | RiskLevel::Extreme => items.push(ChecklistItem::new(
            ChecklistKind::Sunscreen,
            "Apply SPF 30+ sunscreen",
            "Reapply every 2 hours, especially if sweating.",
        )),
        RiskLevel::Medium => items.push(ChecklistItem::new(
            ChecklistKind::Sunscreen,
            "Consider using sunscreen",
            "Sun protection is advisable, even on cloudy days.",
        )),
        RiskLevel::Low => {}
    }

    // rain exposure tops out at High
    match profile.rain_exposure.level {
        RiskLevel::High | RiskLevel::Extreme => items.push(ChecklistItem::new(
            ChecklistKind::Rain,
            "Bring an umbrella or raincoat",
            "Rain is highly likely today.",
        )),
        RiskLevel::Medium => items.push(ChecklistItem::new(
            ChecklistKind::Rain,
            "Pack an umbrella",
            "There's a chance of scattered showers.",
        )),
        RiskLevel::Low => {}
    }

    if profile.aqi_risk.level.is_elevated() {
        items.push(ChecklistItem::new(
            ChecklistKind::Mask,
            "Wear a high-quality mask (N95/KN95)",
            "Limit outdoor time due to poor air quality.",
        ));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClimateData;
    use crate::risk::analyze_risks;

    fn ids(items: &[ChecklistItem]) -> Vec<ChecklistKind> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn test_mild_day_has_only_basics() {
        let profile = analyze_risks(&ClimateData {
            temperature: 70.0,
            humidity: 40.0,
            uv_index: 1.0,
            aqi: 20.0,
            rain_probability: 0.0,
        });
        let items = generate_checklist(&profile);
        assert_eq!(ids(&items), vec![ChecklistKind::Water, ChecklistKind::Clothing]);
        assert_eq!(items[0].recommendation, "Standard hydration");
        assert_eq!(items[1].recommendation, "Dress for comfort");
    }

    #[test]
    fn test_severe_day_has_everything_in_order() {
        let profile = analyze_risks(&ClimateData {
            temperature: 96.0,
            humidity: 60.0,
            uv_index: 10.0,
            aqi: 180.0,
            rain_probability: 80.0,
        });
        let items = generate_checklist(&profile);
        assert_eq!(
            ids(&items),
            vec![
                ChecklistKind::Water,
                ChecklistKind::Clothing,
                ChecklistKind::Sunscreen,
                ChecklistKind::Rain,
                ChecklistKind::Mask
            ]
        );
        assert_eq!(items[0].recommendation, "Stay extra hydrated");
        assert_eq!(items[2].recommendation, "Apply SPF 30+ sunscreen");
        assert_eq!(items[3].recommendation, "Bring an umbrella or raincoat");
    }

    #[test]
    fn test_medium_uv_and_rain_get_softer_items() {
        let profile = analyze_risks(&ClimateData {
            temperature: 70.0,
            humidity: 40.0,
            uv_index: 4.0,
            aqi: 60.0,
            rain_probability: 50.0,
        });
        let items = generate_checklist(&profile);
        assert_eq!(items.len(), 4);
        assert_eq!(items[2].recommendation, "Consider using sunscreen");
        assert_eq!(items[3].recommendation, "Pack an umbrella");
    }

    #[test]
    fn test_ids_serialize_lowercase() {
        let item = ChecklistItem::new(ChecklistKind::Sunscreen, "a", "b");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], "sunscreen");
    }
}
