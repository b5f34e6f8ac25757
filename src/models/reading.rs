//! Station reading model: one raw PM2.5/PM10 observation

use serde::{Deserialize, Serialize};

/// A single validated monitoring-station observation.
///
/// `city` is a free-text location label, often composite
/// ("Anand Vihar - Delhi") or just a city name ("Delhi").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationReading {
    /// Free-text location label from the source dataset
    pub city: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// PM2.5 concentration in µg/m³
    pub pm25: f64,
    /// PM10 concentration in µg/m³, absent for some stations
    pub pm10: Option<f64>,
}

impl StationReading {
    /// Create a new reading
    #[must_use]
    pub fn new(city: impl Into<String>, lat: f64, lon: f64, pm25: f64, pm10: Option<f64>) -> Self {
        Self {
            city: city.into(),
            lat,
            lon,
            pm25,
            pm10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_roundtrip() {
        let reading = StationReading::new("Rohini - Delhi", 28.72, 77.11, 82.5, Some(140.0));
        let json = serde_json::to_string(&reading).unwrap();
        let back: StationReading = serde_json::from_str(&json).unwrap();
        assert_eq!(reading, back);
    }
}
