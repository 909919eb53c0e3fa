//! Geotrack processing core for the IQEngine track services.
//!
//! The modules mirror the map-view data path: recording metadata comes in off
//! the wire, passes through the filtering and coverage stages, and leaves as
//! renderable tracks.

pub mod geotrack;
pub mod math;
pub mod metadata;
pub mod prelude;
pub mod telemetry;

pub use prelude::{GeotrackStage, StageInput, StageOutput};
