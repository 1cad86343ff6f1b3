//! Configuration management for the `StepSafe` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::StepSafeError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `StepSafe` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepSafeConfig {
    /// Climate data provider configuration
    #[serde(default)]
    pub climate: ClimateConfig,
    /// Cache and history store configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Advisory text generation
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Climate API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// Data provider: `open-meteo` or `synthetic`
    #[serde(default = "default_climate_provider")]
    pub provider: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_climate_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_climate_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for current conditions in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; telemetry export is off when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Advisory generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// `rules` for deterministic text, `llm` for the generative model with fallback
    #[serde(default = "default_advisory_mode")]
    pub mode: String,
    /// Generative model API key
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_advisory_base_url")]
    pub base_url: String,
    #[serde(default = "default_advisory_model")]
    pub model: String,
    #[serde(default = "default_advisory_rate_limit")]
    pub max_requests_per_minute: u32,
    #[serde(default = "default_advisory_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// PEM certificate; TLS is enabled when both cert and key are set
    #[serde(default)]
    pub tls_cert_path: Option<String>,
    #[serde(default)]
    pub tls_key_path: Option<String>,
}

// Default value functions
fn default_climate_provider() -> String {
    "open-meteo".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_air_quality_url() -> String {
    "https://air-quality-api.open-meteo.com/v1/air-quality".to_string()
}

fn default_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1/archive".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_climate_timeout() -> u32 {
    30
}

fn default_climate_max_retries() -> u32 {
    3
}

fn default_cache_ttl() -> u32 {
    10
}

fn default_cache_location() -> String {
    "~/.cache/stepsafe".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_advisory_mode() -> String {
    "rules".to_string()
}

fn default_advisory_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_advisory_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_advisory_rate_limit() -> u32 {
    15
}

fn default_advisory_timeout() -> u32 {
    20
}

fn default_server_port() -> u16 {
    9002
}

fn default_request_timeout() -> u32 {
    60
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            provider: default_climate_provider(),
            forecast_url: default_forecast_url(),
            air_quality_url: default_air_quality_url(),
            archive_url: default_archive_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: default_climate_timeout(),
            max_retries: default_climate_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            mode: default_advisory_mode(),
            api_key: None,
            base_url: default_advisory_base_url(),
            model: default_advisory_model(),
            max_requests_per_minute: default_advisory_rate_limit(),
            timeout_seconds: default_advisory_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl StepSafeConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // STEPSAFE__ADVISORY__API_KEY -> advisory.api_key
        builder = builder.add_source(
            Environment::with_prefix("STEPSAFE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: StepSafeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stepsafe").join("config.toml"))
    }

    /// Cache directory with a leading `~/` expanded
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        match self.cache.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.cache.location),
        }
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.climate.provider.is_empty() {
            self.climate.provider = default_climate_provider();
        }
        if self.climate.timeout_seconds == 0 {
            self.climate.timeout_seconds = default_climate_timeout();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.advisory.mode.is_empty() {
            self.advisory.mode = default_advisory_mode();
        }
        if self.advisory.max_requests_per_minute == 0 {
            self.advisory.max_requests_per_minute = default_advisory_rate_limit();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the advisory model credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.advisory.api_key {
            if api_key.is_empty() {
                return Err(StepSafeError::config(
                    "Advisory API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(StepSafeError::config(
                    "Advisory API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        if self.advisory.mode == "llm" && self.advisory.api_key.is_none() {
            return Err(StepSafeError::config(
                "Advisory mode 'llm' requires advisory.api_key to be set",
            )
            .into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.climate.timeout_seconds > 300 {
            return Err(
                StepSafeError::config("Climate API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.climate.max_retries > 10 {
            return Err(StepSafeError::config("Climate API max retries cannot exceed 10").into());
        }

        if self.cache.ttl_minutes > 24 * 60 {
            return Err(
                StepSafeError::config("Cache TTL cannot exceed 1440 minutes (1 day)").into(),
            );
        }

        if self.advisory.max_requests_per_minute > 1000 {
            return Err(StepSafeError::config(
                "Advisory rate limit cannot exceed 1000 requests per minute",
            )
            .into());
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(StepSafeError::config("Request timeout cannot exceed 600 seconds").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(StepSafeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(StepSafeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_providers = ["open-meteo", "synthetic"];
        if !valid_providers.contains(&self.climate.provider.as_str()) {
            return Err(StepSafeError::config(format!(
                "Invalid climate provider '{}'. Must be one of: {}",
                self.climate.provider,
                valid_providers.join(", ")
            ))
            .into());
        }

        let valid_modes = ["rules", "llm"];
        if !valid_modes.contains(&self.advisory.mode.as_str()) {
            return Err(StepSafeError::config(format!(
                "Invalid advisory mode '{}'. Must be one of: {}",
                self.advisory.mode,
                valid_modes.join(", ")
            ))
            .into());
        }

        let urls = [
            &self.climate.forecast_url,
            &self.climate.air_quality_url,
            &self.climate.archive_url,
            &self.climate.geocoding_url,
            &self.advisory.base_url,
        ];
        for url in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(StepSafeError::config(format!(
                    "API URL '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(StepSafeError::config(
                "TLS requires both server.tls_cert_path and server.tls_key_path",
            )
            .into());
        }

        Ok(())
    }
}
