//! Result marker and search outcome models

use serde::{Deserialize, Serialize};

use crate::aqi::AqiCategory;

/// A latitude/longitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One heatmap point handed to the presentation layer.
/// Intensity is the raw PM2.5 concentration.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    pub lat: f64,
    pub lon: f64,
    pub intensity: f64,
}

/// The output unit consumed by the map/popup layer.
///
/// `reading_count == 0` signals a model-predicted marker with no backing
/// observations; such markers carry no PM10 average, no min/max range and
/// are never geocoded per-area.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResultMarker {
    /// Final coordinates, averaged from readings or geocoded
    pub lat: f64,
    pub lon: f64,
    /// Display name: area or city string
    pub label: String,
    /// Inferred monitoring-area name, present only on per-area markers
    pub area: Option<String>,
    /// Average PM2.5 across contributing readings (or the predicted value)
    pub pm25_avg: f64,
    /// Average PM10 where the contributing readings carry one
    pub pm10_avg: Option<f64>,
    /// Lowest PM2.5 among contributing readings
    pub pm25_min: Option<f64>,
    /// Highest PM2.5 among contributing readings
    pub pm25_max: Option<f64>,
    /// AQI score derived from `pm25_avg`
    pub aqi: u16,
    /// AQI band for `pm25_avg`
    pub category: AqiCategory,
    /// Number of station readings contributing to this marker
    pub reading_count: usize,
    /// True only when coordinates came from the geocoding gateway rather
    /// than from averaging readings
    pub was_geocoded: bool,
}

/// Outcome of one search over the station index
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// One aggregated marker (specific search, or a city collapsing to a
    /// single monitoring area)
    Single(ResultMarker),
    /// One marker per distinct monitoring area, in first-seen order
    Multi(Vec<ResultMarker>),
    /// No station matched the term; the fallback predictor applies
    NoMatch,
}

impl SearchOutcome {
    /// All markers in this outcome, in emission order
    #[must_use]
    pub fn markers(&self) -> &[ResultMarker] {
        match self {
            SearchOutcome::Single(marker) => std::slice::from_ref(marker),
            SearchOutcome::Multi(markers) => markers,
            SearchOutcome::NoMatch => &[],
        }
    }
}
