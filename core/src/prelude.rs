use crate::math::geodesy::GeoCoordinate;
use serde::{Deserialize, Serialize};

/// Shared configuration for the geotrack stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Maximum accepted hop between consecutive retained coordinates, in km.
    pub max_hop_km: f64,
    /// Full sensor beamwidth in degrees, assumed nadir-pointing.
    pub beamwidth_deg: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            max_hop_km: 7.19,
            beamwidth_deg: 40.0,
        }
    }
}

/// Input payload for a geotrack stage.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub coordinates: Vec<GeoCoordinate>,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub coordinates: Vec<GeoCoordinate>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub coverage_areas: Option<Vec<f64>>,
    pub dropped: Option<usize>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the per-recording geotrack processing stages.
pub trait GeotrackStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}
