//! Location Resolution Module
//!
//! Turns free-form location input (a "lat,lon" pair or a place name) into a
//! [`Location`] the climate service can query.

use crate::climate::ClimateProvider;
use crate::models::{Location, UserProfile};
use crate::{Result, StepSafeError};
use tracing::debug;

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Location name (city, region, etc.)
    Name(String),
}

/// Location parsing utilities
pub struct LocationParser;

impl LocationParser {
    /// Parse location input. Two numbers are coordinates and must be in range;
    /// anything else is a place name.
    pub fn parse(input: &str) -> Result<LocationInput> {
        let input = input.trim();
        if input.is_empty() {
            return Err(StepSafeError::validation("Location cannot be empty"));
        }

        match Self::split_numbers(input) {
            Some((lat, lon)) => {
                Self::validate_coordinates(lat, lon)?;
                Ok(LocationInput::Coordinates(lat, lon))
            }
            None => Ok(LocationInput::Name(input.to_string())),
        }
    }

    /// "46.8182,8.2275" or "46.8182 8.2275"
    fn split_numbers(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return None;
        }

        let lat = parts[0].parse::<f64>().ok()?;
        let lon = parts[1].parse::<f64>().ok()?;
        Some((lat, lon))
    }

    pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(StepSafeError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(StepSafeError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok(())
    }
}

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a location input into a structured Location
    pub async fn resolve_location(
        provider: &dyn ClimateProvider,
        location_input: LocationInput,
    ) -> Result<Location> {
        debug!("Resolving location input: {:?}", location_input);

        let location = match location_input {
            LocationInput::Coordinates(lat, lon) => Location::from_coordinates(lat, lon),
            LocationInput::Name(name) => Self::resolve_name(provider, name).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }

    /// Parse then resolve free-form text
    pub async fn resolve(provider: &dyn ClimateProvider, input: &str) -> Result<Location> {
        Self::resolve_location(provider, LocationParser::parse(input)?).await
    }

    /// Stored coordinates win; otherwise the city is geocoded
    pub async fn resolve_profile(
        provider: &dyn ClimateProvider,
        profile: &UserProfile,
    ) -> Result<Location> {
        if let Some((lat, lon)) = profile.coordinates() {
            LocationParser::validate_coordinates(lat, lon)?;
            return Ok(Location::new(lat, lon, profile.location.city.clone()));
        }
        Self::resolve_name(provider, profile.location.city.clone()).await
    }

    /// Resolve a location name to coordinates via geocoding
    async fn resolve_name(provider: &dyn ClimateProvider, name: String) -> Result<Location> {
        debug!("Geocoding location name: {}", name);

        let geocoding_results = provider.geocode(&name).await?;

        // Use the first (best) result
        let Some(location) = geocoding_results.into_iter().next() else {
            return Err(StepSafeError::location_not_found(name));
        };
        debug!(
            "Found location: {} ({:.4}, {:.4})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }
}
