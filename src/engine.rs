//! Aggregation engine
//!
//! Turns a free-text search term into aggregated result markers:
//! filters matching stations, classifies the search as broad or
//! specific, partitions broad matches into monitoring areas,
//! disambiguates coincident area coordinates through the geocoding
//! gateway and classifies each marker's AQI.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::aqi;
use crate::area::infer_area_name;
use crate::geocode::GeocodingGateway;
use crate::index::StationIndex;
use crate::models::{Coordinates, ResultMarker, SearchOutcome, StationReading};
use crate::Result;

/// Tokens that mark a search as naming one specific monitoring site
/// rather than a whole city. Configuration data, not logic.
pub const DISAMBIGUATORS: [&str; 8] = [
    "area", "station", "sector", "zone", "park", "road", "airport", "railway",
];

/// Two averaged area positions closer than this in both axes are
/// considered coincident (city-granularity source coordinates).
const COLLISION_EPSILON: f64 = 0.001;

/// An ephemeral grouping of readings sharing an inferred area name
/// within one search.
struct AreaGroup<'a> {
    name: String,
    readings: Vec<&'a StationReading>,
}

/// Aggregate statistics for one group of readings
struct Aggregate {
    pm25_avg: f64,
    pm10_avg: Option<f64>,
    pm25_min: f64,
    pm25_max: f64,
    center: Coordinates,
    count: usize,
}

fn aggregate(readings: &[&StationReading]) -> Aggregate {
    // Callers guarantee non-empty groups; the filter step exits early on
    // zero matches and grouping only partitions existing matches.
    let count = readings.len();
    let n = count as f64;

    let pm25_sum: f64 = readings.iter().map(|r| r.pm25).sum();
    let lat_sum: f64 = readings.iter().map(|r| r.lat).sum();
    let lon_sum: f64 = readings.iter().map(|r| r.lon).sum();

    let pm10_values: Vec<f64> = readings.iter().filter_map(|r| r.pm10).collect();
    let pm10_avg = if pm10_values.is_empty() {
        None
    } else {
        Some(pm10_values.iter().sum::<f64>() / pm10_values.len() as f64)
    };

    let pm25_min = readings.iter().map(|r| r.pm25).fold(f64::INFINITY, f64::min);
    let pm25_max = readings.iter().map(|r| r.pm25).fold(f64::NEG_INFINITY, f64::max);

    Aggregate {
        pm25_avg: pm25_sum / n,
        pm10_avg,
        pm25_min,
        pm25_max,
        center: Coordinates::new(lat_sum / n, lon_sum / n),
        count,
    }
}

/// True when the term reads as a whole-city search: at most two tokens,
/// none of them a site disambiguator.
fn is_broad_search(term: &str) -> bool {
    let tokens: Vec<&str> = term.split_whitespace().collect();
    tokens.len() <= 2
        && !tokens
            .iter()
            .any(|token| DISAMBIGUATORS.contains(&token.to_lowercase().as_str()))
}

/// Partition matches into area groups, preserving first-seen order.
fn group_by_area<'a>(matches: &[&'a StationReading], term: &str) -> Vec<AreaGroup<'a>> {
    let mut groups: Vec<AreaGroup<'a>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for reading in matches {
        let name = infer_area_name(&reading.city, term);
        match positions.get(&name) {
            Some(&index) => groups[index].readings.push(reading),
            None => {
                positions.insert(name.clone(), groups.len());
                groups.push(AreaGroup {
                    name,
                    readings: vec![reading],
                });
            }
        }
    }

    groups
}

/// The core search engine over the station index
pub struct AggregationEngine {
    index: Arc<StationIndex>,
    gateway: Arc<GeocodingGateway>,
}

impl AggregationEngine {
    #[must_use]
    pub fn new(index: Arc<StationIndex>, gateway: Arc<GeocodingGateway>) -> Self {
        Self { index, gateway }
    }

    #[must_use]
    pub fn index(&self) -> &StationIndex {
        &self.index
    }

    /// Run one search over the station index.
    ///
    /// Emission order of multi-area markers follows the first-seen order
    /// of areas during grouping, not alphabetical order.
    pub async fn search(&self, term: &str) -> Result<SearchOutcome> {
        let matches = self.index.matches(term);
        if matches.is_empty() {
            debug!("No station matches for '{term}'");
            return Ok(SearchOutcome::NoMatch);
        }

        debug!("Found {} station matches for '{term}'", matches.len());

        if is_broad_search(term) && matches.len() >= 2 {
            let groups = group_by_area(&matches, term);
            if groups.len() > 1 {
                return Ok(SearchOutcome::Multi(self.area_markers(groups, term).await));
            }
            // A broad search collapsing to one area is labeled with the
            // area's own station string, not the raw term.
            let label = matches[0].city.clone();
            return Ok(SearchOutcome::Single(single_marker(&matches, label)));
        }

        Ok(SearchOutcome::Single(single_marker(&matches, term.to_string())))
    }

    /// Build one marker per area group, resolving coincident averaged
    /// coordinates through the geocoding gateway.
    async fn area_markers(&self, groups: Vec<AreaGroup<'_>>, term: &str) -> Vec<ResultMarker> {
        let aggregates: Vec<Aggregate> = groups.iter().map(|g| aggregate(&g.readings)).collect();
        let mut markers = Vec::with_capacity(groups.len());

        for (i, (group, stats)) in groups.iter().zip(&aggregates).enumerate() {
            let collides = aggregates.iter().enumerate().any(|(j, other)| {
                j != i
                    && (other.center.lat - stats.center.lat).abs() < COLLISION_EPSILON
                    && (other.center.lon - stats.center.lon).abs() < COLLISION_EPSILON
            });

            let first_city = &group.readings[0].city;
            let mut coordinates = stats.center;
            let mut was_geocoded = false;

            if collides && group.name != term && group.name != *first_city {
                coordinates = self
                    .gateway
                    .resolve_area(&group.name, term, stats.center)
                    .await;
                was_geocoded = coordinates != stats.center;
            }

            let (aqi, category) = aqi::classify(stats.pm25_avg);
            markers.push(ResultMarker {
                lat: coordinates.lat,
                lon: coordinates.lon,
                label: first_city.clone(),
                area: Some(group.name.clone()),
                pm25_avg: stats.pm25_avg,
                pm10_avg: stats.pm10_avg,
                pm25_min: Some(stats.pm25_min),
                pm25_max: Some(stats.pm25_max),
                aqi,
                category,
                reading_count: stats.count,
                was_geocoded,
            });
        }

        let geocoded = markers.iter().filter(|m| m.was_geocoded).count();
        info!(
            "'{term}': {} monitoring areas, {geocoded} geocoded to their own locations",
            markers.len()
        );

        markers
    }
}

/// Aggregate every match into one marker with the given label.
fn single_marker(matches: &[&StationReading], label: String) -> ResultMarker {
    let stats = aggregate(matches);
    let (aqi, category) = aqi::classify(stats.pm25_avg);

    ResultMarker {
        lat: stats.center.lat,
        lon: stats.center.lon,
        label,
        area: None,
        pm25_avg: stats.pm25_avg,
        pm10_avg: stats.pm10_avg,
        pm25_min: Some(stats.pm25_min),
        pm25_max: Some(stats.pm25_max),
        aqi,
        category,
        reading_count: stats.count,
        was_geocoded: false,
    }
}
