//! Fallback PM2.5 prediction
//!
//! When no station matches a search term, the term is forward-geocoded
//! and a model-predicted PM2.5 value is requested from the prediction
//! endpoint, yielding a marker with zero backing readings.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aqi;
use crate::config::PredictionConfig;
use crate::error::VayuError;
use crate::geocode::GeocodingGateway;
use crate::models::{Coordinates, ResultMarker};
use crate::Result;

/// PM10 value sent with every prediction request; the model treats it as
/// a prior when no measurement exists.
const DEFAULT_PM10: f64 = 100.0;

/// Prediction seam, implemented by the HTTP client and by test doubles
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    /// Predicted PM2.5 concentration at the given coordinates
    async fn predict_pm25(&self, coordinates: Coordinates) -> Result<f64>;
}

#[derive(Debug, Serialize)]
struct PredictionRequest {
    #[serde(rename = "PM10")]
    pm10: f64,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(rename = "predicted_PM2.5")]
    predicted_pm25: Option<f64>,
}

/// HTTP client for the external PM2.5 regression endpoint
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
}

impl PredictionClient {
    /// Create a new client with the configured timeout.
    pub fn new(config: &PredictionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| VayuError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PredictionProvider for PredictionClient {
    async fn predict_pm25(&self, coordinates: Coordinates) -> Result<f64> {
        let url = format!("{}/predict/pm25", self.base_url);
        debug!("Requesting PM2.5 prediction for ({}, {})", coordinates.lat, coordinates.lon);

        let response = self
            .client
            .post(&url)
            .json(&PredictionRequest {
                pm10: DEFAULT_PM10,
                latitude: coordinates.lat,
                longitude: coordinates.lon,
            })
            .send()
            .await
            .map_err(|e| VayuError::network(format!("prediction request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VayuError::network(format!(
                "prediction service returned {}",
                response.status()
            )));
        }

        let body: PredictionResponse = response
            .json()
            .await
            .map_err(|e| VayuError::parse(format!("failed to parse prediction response: {e}")))?;

        // An otherwise valid body without the field predicts 0.
        Ok(body.predicted_pm25.unwrap_or(0.0))
    }
}

/// Produces the single model-predicted marker for terms with no station
/// coverage. City geocoding failures fail the whole search.
pub struct FallbackPredictor {
    gateway: Arc<GeocodingGateway>,
    provider: Arc<dyn PredictionProvider>,
}

impl FallbackPredictor {
    #[must_use]
    pub fn new(gateway: Arc<GeocodingGateway>, provider: Arc<dyn PredictionProvider>) -> Self {
        Self { gateway, provider }
    }

    /// Resolve `term` to coordinates and predict its PM2.5. The returned
    /// marker carries no range and no geocoded flag; `reading_count` is 0.
    pub async fn predict(&self, term: &str) -> Result<ResultMarker> {
        let coordinates = self.gateway.resolve_city(term).await?;
        let pm25 = self.provider.predict_pm25(coordinates).await?;
        let (aqi, category) = aqi::classify(pm25);

        info!("Predicted PM2.5 {pm25:.1} for '{term}' ({category:?})");

        Ok(ResultMarker {
            lat: coordinates.lat,
            lon: coordinates.lon,
            label: term.to_string(),
            area: None,
            pm25_avg: pm25,
            pm10_avg: None,
            pm25_min: None,
            pm25_max: None,
            aqi,
            category,
            reading_count: 0,
            was_geocoded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeocodeProvider;

    struct FixedGeocoder(Vec<Coordinates>);

    #[async_trait]
    impl GeocodeProvider for FixedGeocoder {
        async fn lookup(&self, _query: &str, _limit: u32) -> Result<Vec<Coordinates>> {
            Ok(self.0.clone())
        }
    }

    struct FixedPrediction(f64);

    #[async_trait]
    impl PredictionProvider for FixedPrediction {
        async fn predict_pm25(&self, _coordinates: Coordinates) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_predict_builds_zero_reading_marker() {
        let gateway = Arc::new(GeocodingGateway::new(Arc::new(FixedGeocoder(vec![
            Coordinates::new(26.92, 75.78),
        ]))));
        let predictor = FallbackPredictor::new(gateway, Arc::new(FixedPrediction(85.0)));

        let marker = predictor.predict("jaipur").await.unwrap();
        assert_eq!(marker.label, "jaipur");
        assert_eq!(marker.reading_count, 0);
        assert_eq!(marker.pm25_avg, 85.0);
        assert!(marker.pm10_avg.is_none());
        assert!(marker.pm25_min.is_none());
        assert!(!marker.was_geocoded);
    }

    #[tokio::test]
    async fn test_predict_fails_when_city_unknown() {
        let gateway = Arc::new(GeocodingGateway::new(Arc::new(FixedGeocoder(Vec::new()))));
        let predictor = FallbackPredictor::new(gateway, Arc::new(FixedPrediction(85.0)));

        let result = predictor.predict("atlantis").await;
        assert!(matches!(result, Err(VayuError::NotFound { .. })));
    }
}
