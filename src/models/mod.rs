//! Core data models for the `vayu` engine

pub mod marker;
pub mod reading;

pub use marker::{Coordinates, HeatPoint, ResultMarker, SearchOutcome};
pub use reading::StationReading;
