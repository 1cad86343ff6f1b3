//! Time-of-day outdoor guidance

use super::RiskProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WindowLevel {
    Safer,
    Unsafe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeWindow {
    pub period: String,
    pub level: WindowLevel,
    pub reason: String,
}

impl TimeWindow {
    fn new(period: &str, level: WindowLevel, reason: &str) -> Self {
        Self {
            period: period.to_string(),
            level,
            reason: reason.to_string(),
        }
    }
}

/// Midday is flagged when heat or UV is High or above; windows are sorted by period text
#[must_use]
pub fn generate_time_windows(profile: &RiskProfile) -> Vec<TimeWindow> {
    let mut windows = if profile.has_midday_hazard() {
        vec![
            TimeWindow::new(
                "11:00 AM - 4:00 PM",
                WindowLevel::Unsafe,
                "Peak UV and heat levels. Best to stay indoors.",
            ),
            TimeWindow::new(
                "Before 11:00 AM",
                WindowLevel::Safer,
                "Cooler temperatures and lower UV exposure.",
            ),
            TimeWindow::new(
                "After 4:00 PM",
                WindowLevel::Safer,
                "Sun is less intense and temperatures start to drop.",
            ),
        ]
    } else {
        vec![TimeWindow::new(
            "All Day",
            WindowLevel::Safer,
            "Conditions are favorable for outdoor activities throughout the day.",
        )]
    };

    windows.sort_by(|a, b| a.period.cmp(&b.period));
    windows
}
