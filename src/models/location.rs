//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// Resolved location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// Country name or code
    pub country: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: None,
        }
    }

    /// Location named after its own coordinates
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, format!("{latitude:.4}, {longitude:.4}"))
    }

    /// Cache key for climate snapshots at this location, e.g. `current-46.8182-8.2275`
    #[must_use]
    pub fn cache_key(&self, kind: &str) -> String {
        format!("{kind}-{:.4}-{:.4}", self.latitude, self.longitude)
    }
}
