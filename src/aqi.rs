//! AQI calculation for PM2.5 concentrations
//!
//! Uses the Indian national AQI breakpoints with linear interpolation
//! inside each band. The band that supplies the interpolation parameters
//! also names the category, so score and category cannot drift apart.

use serde::{Deserialize, Serialize};

/// The six Indian AQI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Severe,
}

impl AqiCategory {
    /// Display label, matching the popup text of the map layer
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }

    /// Marker color used by the presentation layer
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            AqiCategory::Good => "green",
            AqiCategory::Satisfactory => "yellow",
            AqiCategory::Moderate => "orange",
            AqiCategory::Poor => "red",
            AqiCategory::VeryPoor => "darkred",
            AqiCategory::Severe => "brown",
        }
    }
}

/// One breakpoint band: concentration range and AQI range
struct Band {
    c_low: f64,
    c_high: f64,
    aqi_low: f64,
    aqi_high: f64,
    category: AqiCategory,
}

/// Indian PM2.5 AQI breakpoints. Concentrations above 500 µg/m³ clamp
/// into the Severe band rather than extrapolating past it.
const BANDS: [Band; 6] = [
    Band { c_low: 0.0, c_high: 30.0, aqi_low: 0.0, aqi_high: 50.0, category: AqiCategory::Good },
    Band { c_low: 30.1, c_high: 60.0, aqi_low: 51.0, aqi_high: 100.0, category: AqiCategory::Satisfactory },
    Band { c_low: 60.1, c_high: 90.0, aqi_low: 101.0, aqi_high: 200.0, category: AqiCategory::Moderate },
    Band { c_low: 90.1, c_high: 120.0, aqi_low: 201.0, aqi_high: 300.0, category: AqiCategory::Poor },
    Band { c_low: 120.1, c_high: 250.0, aqi_low: 301.0, aqi_high: 400.0, category: AqiCategory::VeryPoor },
    Band { c_low: 250.1, c_high: 500.0, aqi_low: 401.0, aqi_high: 500.0, category: AqiCategory::Severe },
];

fn band_for(pm25: f64) -> &'static Band {
    BANDS
        .iter()
        .find(|band| pm25 <= band.c_high)
        .unwrap_or(&BANDS[BANDS.len() - 1])
}

/// Calculate the AQI score and category for a PM2.5 concentration.
///
/// Total over all inputs: negative concentrations are treated as 0 and
/// anything above 500 µg/m³ is clamped to the top of the Severe band.
///
/// AQI = aqi_low + (aqi_high - aqi_low) / (c_high - c_low) * (pm25 - c_low),
/// rounded to the nearest integer.
#[must_use]
pub fn classify(pm25: f64) -> (u16, AqiCategory) {
    let pm25 = if pm25.is_finite() { pm25.clamp(0.0, 500.0) } else { 0.0 };
    let band = band_for(pm25);
    let span = band.aqi_high - band.aqi_low;
    let width = band.c_high - band.c_low;
    let aqi = band.aqi_low + span / width * (pm25 - band.c_low);
    (aqi.round().max(0.0) as u16, band.category)
}

/// AQI score alone, for popup display
#[must_use]
pub fn score(pm25: f64) -> u16 {
    classify(pm25).0
}

/// Category alone, for marker coloring
#[must_use]
pub fn category(pm25: f64) -> AqiCategory {
    classify(pm25).1
}
