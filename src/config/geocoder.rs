//! Geocoding service settings, from the environment or a TOML file.

use crate::core::geocode::{GeocodeResolver, OpenCageGeocoder, RetryPolicy, DEFAULT_COUNTRY};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_positive_number, validate_required_secret, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENCAGE_API_KEY";
pub const BASE_URL_VAR: &str = "OPENCAGE_BASE_URL";

fn default_base_url() -> String {
    OpenCageGeocoder::DEFAULT_BASE_URL.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_pacing_ms() -> u64 {
    1000
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeocoderSettings {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl std::fmt::Debug for GeocoderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderSettings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("country", &self.country)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_attempts", &self.retry_attempts)
            .field("backoff_ms", &self.backoff_ms)
            .field("pacing_ms", &self.pacing_ms)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    geocoder: GeocoderSettings,
}

impl GeocoderSettings {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: default_base_url(),
            country: default_country(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            backoff_ms: default_backoff_ms(),
            pacing_ms: default_pacing_ms(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EtlError::MissingConfigError {
                field: API_KEY_VAR.to_string(),
            })?;

        let mut settings = Self::new(api_key.trim());
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            settings.base_url = base_url.trim().to_string();
        }
        Ok(settings)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a `[geocoder]` table. `${VAR}` references are replaced from
    /// the environment; unknown variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        let file: SettingsFile = toml::from_str(&processed)?;
        Ok(file.geocoder)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            base_backoff: Duration::from_millis(self.backoff_ms),
            pacing: Duration::from_millis(self.pacing_ms),
        }
    }

    pub fn build_geocoder(&self) -> Result<OpenCageGeocoder> {
        OpenCageGeocoder::new(
            &self.base_url,
            &self.api_key,
            Duration::from_secs(self.timeout_secs),
        )
    }

    pub fn build_resolver(&self) -> Result<GeocodeResolver<OpenCageGeocoder>> {
        Ok(GeocodeResolver::with_country(
            self.build_geocoder()?,
            self.retry_policy(),
            &self.country,
        ))
    }
}

impl Validate for GeocoderSettings {
    fn validate(&self) -> Result<()> {
        validate_required_secret(API_KEY_VAR, &self.api_key)?;
        if self.api_key.starts_with("${") {
            return Err(EtlError::MissingConfigError {
                field: API_KEY_VAR.to_string(),
            });
        }
        validate_url("geocoder.base_url", &self.base_url)?;
        validate_positive_number("geocoder.timeout_secs", self.timeout_secs, 1)?;
        validate_positive_number("geocoder.retry_attempts", u64::from(self.retry_attempts), 1)?;
        Ok(())
    }
}

fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::InvalidConfigValueError {
        field: "config".to_string(),
        value: content.len().to_string(),
        reason: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
