//! Station index: the searchable in-memory view of the dataset
//!
//! Built once at load time; holds the validated readings, the
//! autocomplete vocabulary and the heatmap feed.

use std::collections::BTreeSet;

use tracing::info;

use crate::models::{HeatPoint, StationReading};

/// Recognized major city names. Labels are composite free text, so a
/// token is only promoted into the autocomplete vocabulary when it names
/// one of these. Configuration data, not logic: swap the table for a
/// different dataset.
pub const MAJOR_CITIES: [&str; 36] = [
    "delhi",
    "mumbai",
    "bangalore",
    "kolkata",
    "chennai",
    "hyderabad",
    "pune",
    "ahmedabad",
    "jaipur",
    "lucknow",
    "kanpur",
    "nagpur",
    "indore",
    "bhopal",
    "visakhapatnam",
    "pimpri",
    "patna",
    "vadodara",
    "agra",
    "nashik",
    "faridabad",
    "meerut",
    "rajkot",
    "kalyan",
    "vasai",
    "varanasi",
    "srinagar",
    "aurangabad",
    "dhanbad",
    "amritsar",
    "allahabad",
    "gwalior",
    "jabalpur",
    "coimbatore",
    "madurai",
    "jodhpur",
];

/// Searchable in-memory representation of the station snapshot
#[derive(Debug)]
pub struct StationIndex {
    readings: Vec<StationReading>,
    /// Lexicographically sorted autocomplete vocabulary, lower-cased
    terms: Vec<String>,
    /// Rows dropped during dataset validation, kept for diagnostics
    dropped: usize,
}

impl StationIndex {
    /// Build the index from validated readings.
    #[must_use]
    pub fn build(readings: Vec<StationReading>, dropped: usize) -> Self {
        let mut vocabulary = BTreeSet::new();

        for reading in &readings {
            let label = reading.city.to_lowercase();

            // Promote the segment naming a recognized major city, so a
            // bare "delhi" suggests even when every label is composite.
            if let Some(city_segment) = label
                .split(['-', ','])
                .find(|segment| MAJOR_CITIES.iter().any(|city| segment.contains(city)))
            {
                let city_segment = city_segment.trim();
                if !city_segment.is_empty() {
                    vocabulary.insert(city_segment.to_string());
                }
            }

            if !label.is_empty() {
                vocabulary.insert(label);
            }
        }

        let terms: Vec<String> = vocabulary.into_iter().collect();
        info!(
            "Station index built: {} readings, {} autocomplete terms",
            readings.len(),
            terms.len()
        );

        Self {
            readings,
            terms,
            dropped,
        }
    }

    /// All validated readings, in dataset order
    #[must_use]
    pub fn readings(&self) -> &[StationReading] {
        &self.readings
    }

    /// Number of snapshot rows dropped at load time
    #[must_use]
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }

    /// Readings whose label contains `term`, case-insensitive, in
    /// dataset order.
    #[must_use]
    pub fn matches(&self, term: &str) -> Vec<&StationReading> {
        let term = term.to_lowercase();
        self.readings
            .iter()
            .filter(|reading| reading.city.to_lowercase().contains(&term))
            .collect()
    }

    /// Autocomplete suggestions: case-insensitive substring match over
    /// the vocabulary, lexicographic order, capped at `limit`.
    #[must_use]
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&str> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let prefix = prefix.to_lowercase();
        self.terms
            .iter()
            .filter(|term| term.contains(&prefix))
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    /// The heatmap feed: every reading as a point with its raw PM2.5
    /// concentration as intensity.
    #[must_use]
    pub fn heat_points(&self) -> Vec<HeatPoint> {
        self.readings
            .iter()
            .map(|reading| HeatPoint {
                lat: reading.lat,
                lon: reading.lon,
                intensity: reading.pm25,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> StationIndex {
        StationIndex::build(
            vec![
                StationReading::new("Anand Vihar - Delhi", 28.65, 77.31, 80.0, Some(150.0)),
                StationReading::new("Rohini - Delhi", 28.72, 77.11, 40.0, Some(90.0)),
                StationReading::new("Shivaji Nagar - Pune", 18.53, 73.85, 55.0, None),
                StationReading::new("Haldia", 22.06, 88.06, 35.0, None),
            ],
            1,
        )
    }

    #[test]
    fn test_vocabulary_includes_promoted_city_segments() {
        let index = sample_index();
        let suggestions = index.suggest("delhi", 10);
        assert!(suggestions.contains(&"delhi"));
        assert!(suggestions.contains(&"anand vihar - delhi"));
        assert!(suggestions.contains(&"rohini - delhi"));
    }

    #[test]
    fn test_unrecognized_city_keeps_only_full_label() {
        let index = sample_index();
        let suggestions = index.suggest("haldia", 10);
        assert_eq!(suggestions, vec!["haldia"]);
    }

    #[test]
    fn test_suggest_is_sorted_and_capped() {
        let index = sample_index();
        let all = index.suggest("a", 100);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(all, sorted);

        assert_eq!(index.suggest("a", 2).len(), 2);
        assert!(index.suggest("", 10).is_empty());
    }

    #[test]
    fn test_matches_preserve_dataset_order() {
        let index = sample_index();
        let matches = index.matches("Delhi");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].city, "Anand Vihar - Delhi");
        assert_eq!(matches[1].city, "Rohini - Delhi");
        assert!(index.matches("goa").is_empty());
    }

    #[test]
    fn test_heat_points_use_raw_pm25() {
        let index = sample_index();
        let points = index.heat_points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].intensity, 80.0);
        assert_eq!(index.dropped_rows(), 1);
    }
}
