//! Search service facade
//!
//! Single entry point for the presentation layer: chains the
//! aggregation engine with the fallback predictor and makes the latest
//! search authoritative. Overlapping autocomplete-triggered searches
//! cannot interleave stale state into the UI: a search that finishes
//! after a newer one has started reports `Superseded` instead of a
//! result.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::engine::AggregationEngine;
use crate::error::VayuError;
use crate::index::StationIndex;
use crate::models::{HeatPoint, SearchOutcome};
use crate::predict::FallbackPredictor;
use crate::Result;

/// Default suggestion cap, matching the UI dropdown
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

pub struct SearchService {
    engine: AggregationEngine,
    predictor: FallbackPredictor,
    latest: AtomicU64,
}

impl SearchService {
    #[must_use]
    pub fn new(engine: AggregationEngine, predictor: FallbackPredictor) -> Self {
        Self {
            engine,
            predictor,
            latest: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn index(&self) -> &StationIndex {
        self.engine.index()
    }

    /// Run one search, falling back to the model prediction when no
    /// station matches. Empty terms resolve to `NoMatch` without
    /// touching the network.
    pub async fn search(&self, term: &str) -> Result<SearchOutcome> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(SearchOutcome::NoMatch);
        }

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Search started for '{term}'");

        let result = self.run(term).await;

        // Discard results of searches a newer request has superseded.
        if self.latest.load(Ordering::SeqCst) != token {
            debug!("Search for '{term}' superseded");
            return Err(VayuError::Superseded);
        }

        result
    }

    async fn run(&self, term: &str) -> Result<SearchOutcome> {
        match self.engine.search(term).await? {
            SearchOutcome::NoMatch => {
                info!("No station data for '{term}', using model prediction");
                let marker = self.predictor.predict(term).await?;
                Ok(SearchOutcome::Single(marker))
            }
            outcome => Ok(outcome),
        }
    }

    /// Autocomplete suggestions for a partial term
    #[must_use]
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&str> {
        self.index().suggest(prefix, limit)
    }

    /// The heatmap feed for the presentation layer
    #[must_use]
    pub fn heat_points(&self) -> Vec<HeatPoint> {
        self.index().heat_points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{GeocodeProvider, GeocodingGateway};
    use crate::models::{Coordinates, StationReading};
    use crate::predict::PredictionProvider;
    use async_trait::async_trait;
    use std::sync::Arc;

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

    fn service(readings: Vec<StationReading>, geocoded: Vec<Coordinates>) -> SearchService {
        let index = Arc::new(StationIndex::build(readings, 0));
        let gateway = Arc::new(GeocodingGateway::new(Arc::new(FixedGeocoder(geocoded))));
        let engine = AggregationEngine::new(index, gateway.clone());
        let predictor = FallbackPredictor::new(gateway, Arc::new(FixedPrediction(85.0)));
        SearchService::new(engine, predictor)
    }

    #[tokio::test]
    async fn test_fallback_prediction_on_no_match() {
        let svc = service(
            vec![StationReading::new("Rohini - Delhi", 28.72, 77.11, 40.0, None)],
            vec![Coordinates::new(26.92, 75.78)],
        );

        let outcome = svc.search("jaipur").await.unwrap();
        let SearchOutcome::Single(marker) = outcome else {
            panic!("expected single predicted marker");
        };
        assert_eq!(marker.reading_count, 0);
        assert_eq!(marker.pm25_avg, 85.0);
        assert_eq!(marker.lat, 26.92);
    }

    #[tokio::test]
    async fn test_unknown_city_surfaces_not_found() {
        let svc = service(Vec::new(), Vec::new());
        let result = svc.search("atlantis").await;
        assert!(matches!(result, Err(VayuError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_term_is_no_match() {
        let svc = service(Vec::new(), Vec::new());
        assert_eq!(svc.search("   ").await.unwrap(), SearchOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_idempotent_with_warmed_cache() {
        let readings = vec![
            StationReading::new("Anand Vihar - Delhi", 28.6, 77.2, 80.0, Some(150.0)),
            StationReading::new("Rohini - Delhi", 28.6, 77.2, 40.0, Some(90.0)),
        ];
        let svc = service(readings, vec![Coordinates::new(28.65, 77.31)]);

        let first = svc.search("delhi").await.unwrap();
        let second = svc.search("delhi").await.unwrap();
        assert_eq!(first, second);
    }
}
