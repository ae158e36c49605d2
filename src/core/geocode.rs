//! Postal code geocoding with a per-run cache and bounded retry.

use crate::domain::model::Coordinates;
use crate::domain::ports::Geocoder;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub const DEFAULT_COUNTRY: &str = "Canada";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    /// Pause after every successful remote lookup.
    pub pacing: Duration,
}

impl RetryPolicy {
    /// No waiting at all; used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff: Duration::ZERO,
            pacing: Duration::ZERO,
        }
    }

    /// Delay after the given failed attempt (1-based): base, 2x base, 4x base...
    /// Saturates at `Duration::MAX`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .checked_mul(1u32 << exponent)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
            pacing: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeResult {
    Found(Coordinates),
    NotFound,
}

impl GeocodeResult {
    pub fn coordinates(self) -> Option<Coordinates> {
        match self {
            GeocodeResult::Found(c) => Some(c),
            GeocodeResult::NotFound => None,
        }
    }
}

/// Results keyed by normalized postal code, negative results included.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: HashMap<String, GeocodeResult>,
}

impl GeocodeCache {
    pub fn get(&self, postal_code: &str) -> Option<GeocodeResult> {
        self.entries.get(postal_code).copied()
    }

    pub fn insert(&mut self, postal_code: String, result: GeocodeResult) {
        self.entries.insert(postal_code, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves postal codes for one run. Never fails: every error path ends
/// in a cached `NotFound`.
pub struct GeocodeResolver<G: Geocoder> {
    geocoder: G,
    policy: RetryPolicy,
    country: String,
    cache: Mutex<GeocodeCache>,
    remote_calls: AtomicUsize,
}

impl<G: Geocoder> GeocodeResolver<G> {
    pub fn new(geocoder: G, policy: RetryPolicy) -> Self {
        Self::with_country(geocoder, policy, DEFAULT_COUNTRY)
    }

    pub fn with_country(geocoder: G, policy: RetryPolicy, country: &str) -> Self {
        Self {
            geocoder,
            policy,
            country: country.to_string(),
            cache: Mutex::new(GeocodeCache::default()),
            remote_calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests sent to the geocoder, retries included.
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::Relaxed)
    }

    pub async fn resolve(&self, postal_code: &str) -> GeocodeResult {
        let mut cache = self.cache.lock().await;
        if let Some(hit) = cache.get(postal_code) {
            debug!("Geocode cache hit for {}", postal_code);
            return hit;
        }

        let result = self.lookup_with_retry(postal_code).await;
        cache.insert(postal_code.to_string(), result);
        result
    }

    async fn lookup_with_retry(&self, postal_code: &str) -> GeocodeResult {
        let query = format!("{}, {}", postal_code, self.country);
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.remote_calls.fetch_add(1, Ordering::Relaxed);
            debug!("Geocoding {} (attempt {})", query, attempt);

            match self.geocoder.lookup(&query).await {
                Ok(Some(coordinates)) => {
                    info!(
                        "📍 {} → {:.6}, {:.6}",
                        postal_code, coordinates.latitude, coordinates.longitude
                    );
                    if !self.policy.pacing.is_zero() {
                        sleep(self.policy.pacing).await;
                    }
                    return GeocodeResult::Found(coordinates);
                }
                Ok(None) => {
                    warn!("No geocoding results for {}", postal_code);
                    return GeocodeResult::NotFound;
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff_delay(attempt);
                    warn!(
                        attempt,
                        "Geocoding {} failed: {}; retrying after {:?}", postal_code, err, delay
                    );
                    sleep(delay).await;
                }
                Err(err) => {
                    warn!(
                        attempt,
                        "Geocoding {} failed: {}; giving up", postal_code, err
                    );
                    return GeocodeResult::NotFound;
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

/// OpenCage forward geocoding client.
pub struct OpenCageGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenCageGeocoder {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.opencagedata.com/geocode/v1/json";

    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("key", self.api_key.as_str()), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;

        let body: OpenCageResponse = response.json().await?;
        Ok(body.results.into_iter().next().map(|r| Coordinates {
            latitude: r.geometry.lat,
            longitude: r.geometry.lng,
        }))
    }
}
