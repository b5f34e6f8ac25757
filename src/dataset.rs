//! Dataset loading and validation
//!
//! The station snapshot is a JSON array of loosely-typed records; rows
//! with non-numeric coordinates never enter the index. Loaded once at
//! startup.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::VayuError;
use crate::models::StationReading;
use crate::Result;

/// Outcome of a snapshot load: validated readings plus the number of
/// rows dropped for failing validation.
#[derive(Debug)]
pub struct LoadedDataset {
    pub readings: Vec<StationReading>,
    pub dropped: usize,
}

/// One raw row as it appears in the snapshot. Coordinates and
/// concentrations are kept as JSON values so a bad row can be dropped
/// instead of failing the whole load.
#[derive(Debug, Deserialize)]
struct RawRecord {
    city: Option<String>,
    lat: Option<Value>,
    lon: Option<Value>,
    pm25: Option<Value>,
    pm10: Option<Value>,
}

fn numeric(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

impl RawRecord {
    /// Validate into a typed reading. `lat`, `lon` and `pm25` must be
    /// finite numbers; `pm10` is optional and dropped when non-numeric.
    fn validate(self) -> Option<StationReading> {
        let city = self.city.filter(|c| !c.is_empty())?;
        let lat = numeric(self.lat.as_ref())?;
        let lon = numeric(self.lon.as_ref())?;
        let pm25 = numeric(self.pm25.as_ref())?;
        let pm10 = numeric(self.pm10.as_ref());
        Some(StationReading::new(city, lat, lon, pm25, pm10))
    }
}

/// Parse a snapshot from raw JSON bytes.
pub fn parse(bytes: &[u8]) -> Result<LoadedDataset> {
    let rows: Vec<RawRecord> = serde_json::from_slice(bytes)
        .map_err(|e| VayuError::dataset(format!("failed to parse station snapshot: {e}")))?;

    let total = rows.len();
    let readings: Vec<StationReading> = rows.into_iter().filter_map(RawRecord::validate).collect();
    let dropped = total - readings.len();

    if dropped > 0 {
        warn!("Dropped {dropped} of {total} rows with invalid coordinates or readings");
    }
    info!("Loaded {} station readings", readings.len());

    Ok(LoadedDataset { readings, dropped })
}

/// Load and validate the snapshot file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedDataset> {
    let path = path.as_ref();
    info!("Loading station snapshot from {}", path.display());
    let bytes = std::fs::read(path)?;
    parse(&bytes)
}
