//! Geocoding gateway
//!
//! Wraps the external forward-geocoding service behind a provider trait
//! and an in-memory, process-lifetime cache. The cache is owned by the
//! gateway and injected where needed, never ambient module state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::GeocodingConfig;
use crate::error::VayuError;
use crate::models::Coordinates;
use crate::Result;

/// Forward-geocoding seam: best-first candidate coordinates for a
/// free-text query. Implemented by the Nominatim client and by test
/// doubles.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    async fn lookup(&self, query: &str, limit: u32) -> Result<Vec<Coordinates>>;
}

/// One place entry from the Nominatim search endpoint. Coordinates come
/// back as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim-backed geocoding client
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a new client with the configured timeout and user agent.
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| VayuError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeocodeProvider for NominatimClient {
    async fn lookup(&self, query: &str, limit: u32) -> Result<Vec<Coordinates>> {
        let url = format!(
            "{}/search?format=json&q={}&limit={limit}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!("Geocoding query: {query}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VayuError::network(format!("geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VayuError::network(format!(
                "geocoding service returned {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| VayuError::parse(format!("failed to parse geocoding response: {e}")))?;

        places
            .into_iter()
            .map(|place| {
                let lat = place.lat.parse::<f64>();
                let lon = place.lon.parse::<f64>();
                match (lat, lon) {
                    (Ok(lat), Ok(lon)) => Ok(Coordinates::new(lat, lon)),
                    _ => Err(VayuError::parse(format!(
                        "non-numeric coordinates in geocoding response for '{query}'"
                    ))),
                }
            })
            .collect()
    }
}

/// Caching gateway over a `GeocodeProvider`.
///
/// Both lookups memoize on a normalized key. A per-key lock is held
/// across the network call so concurrent identical lookups resolve to
/// exactly one request, first writer wins; lookups for distinct keys
/// proceed independently.
pub struct GeocodingGateway {
    provider: Arc<dyn GeocodeProvider>,
    cache: Mutex<HashMap<String, Coordinates>>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GeocodingGateway {
    #[must_use]
    pub fn new(provider: Arc<dyn GeocodeProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Forward-geocode a free-text place name. Fails with `NotFound`
    /// when the service returns zero results; network and parse failures
    /// propagate.
    pub async fn resolve_city(&self, name: &str) -> Result<Coordinates> {
        let key = format!("city:{}", name.trim().to_lowercase());

        if let Some(coordinates) = self.cache.lock().await.get(&key) {
            debug!("Geocode cache hit for {key}");
            return Ok(*coordinates);
        }

        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        // An identical lookup may have filled the cache while waiting.
        if let Some(coordinates) = self.cache.lock().await.get(&key) {
            return Ok(*coordinates);
        }

        let results = self.provider.lookup(name, 1).await?;
        let Some(coordinates) = results.first().copied() else {
            return Err(VayuError::not_found(name));
        };

        self.cache.lock().await.insert(key, coordinates);
        Ok(coordinates)
    }

    /// Geocode a monitoring area within a city. On zero results or any
    /// failure, returns the fallback coordinates instead of raising; the
    /// fallback outcome is cached so repeats never re-request.
    pub async fn resolve_area(
        &self,
        area_name: &str,
        city_name: &str,
        fallback: Coordinates,
    ) -> Coordinates {
        let key = format!(
            "area:{}_{}",
            area_name.trim().to_lowercase(),
            city_name.trim().to_lowercase()
        );

        if let Some(coordinates) = self.cache.lock().await.get(&key) {
            debug!("Geocode cache hit for {key}");
            return *coordinates;
        }

        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        if let Some(coordinates) = self.cache.lock().await.get(&key) {
            return *coordinates;
        }

        let query = format!("{area_name}, {city_name}, India");
        let coordinates = match self.provider.lookup(&query, 1).await {
            Ok(results) if !results.is_empty() => {
                let resolved = results[0];
                info!("Geocoded {area_name} in {city_name} to ({}, {})", resolved.lat, resolved.lon);
                resolved
            }
            Ok(_) => {
                warn!("No geocoding result for {area_name}, using fallback coordinates");
                fallback
            }
            Err(e) => {
                warn!("Geocoding failed for {area_name}: {e}, using fallback coordinates");
                fallback
            }
        };

        self.cache.lock().await.insert(key, coordinates);
        coordinates
    }

    /// Number of cached entries, for diagnostics
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}
