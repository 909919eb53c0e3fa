use crate::prelude::{
    GeotrackStage, StageError, StageInput, StageMetadata, StageOutput, StageResult, TrackConfig,
};
use std::f64::consts::PI;

/// Ground footprint area of a nadir-pointing cone, in square km.
///
/// Flat-Earth approximation: no curvature correction and no off-nadir
/// pointing model.
pub fn footprint_area_km2(alt_m: f64, beamwidth_deg: f64) -> f64 {
    let altitude_km = alt_m / 1000.0;
    let beamwidth_rad = beamwidth_deg.to_radians();
    let radius_km = altitude_km * (beamwidth_rad / 2.0).tan();
    PI * radius_km * radius_km
}

/// Per-coordinate coverage-area estimation stage.
pub struct CoverageStage {
    config: Option<TrackConfig>,
}

impl CoverageStage {
    pub fn new() -> Self {
        Self { config: None }
    }
}

impl Default for CoverageStage {
    fn default() -> Self {
        Self::new()
    }
}

impl GeotrackStage for CoverageStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let mut coverage_areas = Vec::with_capacity(input.coordinates.len());
        for coordinate in &input.coordinates {
            if !coordinate.alt_m.is_finite() {
                return Err(StageError::InvalidInput(format!(
                    "non-finite altitude {}",
                    coordinate.alt_m
                )));
            }
            coverage_areas.push(footprint_area_km2(coordinate.alt_m, config.beamwidth_deg));
        }

        let metadata = StageMetadata {
            coverage_areas: Some(coverage_areas),
            notes: vec![format!("beamwidth {:.1} deg", config.beamwidth_deg)],
            ..Default::default()
        };

        Ok(StageOutput {
            coordinates: input.coordinates,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
