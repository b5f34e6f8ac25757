//! `Vayu` - Air quality search and aggregation engine
//!
//! This library resolves free-text place searches against a station
//! dataset, aggregates readings per area, and produces AQI map markers,
//! falling back to a model prediction when no station matches.

pub mod api;
pub mod aqi;
pub mod area;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod geocode;
pub mod index;
pub mod models;
pub mod predict;
pub mod service;

// Re-export core types for public API
pub use aqi::AqiCategory;
pub use config::VayuConfig;
pub use engine::AggregationEngine;
pub use error::VayuError;
pub use geocode::{GeocodeProvider, GeocodingGateway, NominatimClient};
pub use index::StationIndex;
pub use models::{Coordinates, HeatPoint, ResultMarker, SearchOutcome, StationReading};
pub use predict::{FallbackPredictor, PredictionClient, PredictionProvider};
pub use service::SearchService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, VayuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
