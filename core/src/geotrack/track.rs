use crate::geotrack::{CoverageStage, FilterStage};
use crate::math::geodesy::GeoCoordinate;
use crate::metadata::RecordingMetadata;
use crate::prelude::{GeotrackStage, StageError, StageInput, StageResult, TrackConfig};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// A renderable ground track derived from one recording.
///
/// `positions` are `(lat, lon)` pairs, swapped relative to the wire ordering
/// to match the renderer's convention. `positions` and `coverage_areas`
/// always have equal length with index correspondence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: usize,
    pub name: String,
    pub description: String,
    pub positions: Vec<(f64, f64)>,
    pub coverage_areas: Vec<f64>,
}

impl Track {
    /// Mean footprint area across the track, in square km.
    pub fn mean_coverage_km2(&self) -> f64 {
        if self.coverage_areas.is_empty() {
            return 0.0;
        }
        self.coverage_areas.iter().sum::<f64>() / self.coverage_areas.len() as f64
    }
}

/// Runs the filter and coverage stages per recording and assembles tracks.
pub struct TrackBuilder {
    config: TrackConfig,
    logger: LogManager,
}

impl TrackBuilder {
    pub fn new(config: TrackConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    /// Builds a single track from raw coordinates and recording-level fields.
    pub fn build(
        &self,
        id: usize,
        account: &str,
        container: &str,
        description: &str,
        coordinates: Vec<GeoCoordinate>,
    ) -> StageResult<Track> {
        let mut filter_stage = FilterStage::new();
        filter_stage.initialize(&self.config)?;
        let filter_output = filter_stage.execute(StageInput { coordinates })?;
        filter_stage.cleanup();

        let mut coverage_stage = CoverageStage::new();
        coverage_stage.initialize(&self.config)?;
        let coverage_output = coverage_stage.execute(StageInput {
            coordinates: filter_output.coordinates,
        })?;
        coverage_stage.cleanup();

        let coverage_areas = coverage_output
            .metadata
            .coverage_areas
            .ok_or_else(|| StageError::Internal("coverage stage produced no areas".into()))?;

        let positions: Vec<(f64, f64)> = coverage_output
            .coordinates
            .iter()
            .map(|coordinate| (coordinate.lat, coordinate.lon))
            .collect();

        if positions.is_empty() {
            self.logger.record_warning(&format!(
                "track {} ({}/{}) has no usable positions",
                id, account, container
            ));
        } else {
            self.logger.record(&format!(
                "track {} ({}/{}) retained {} positions",
                id,
                account,
                container,
                positions.len()
            ));
        }

        Ok(Track {
            id,
            name: format!("{}/{}", account, container),
            description: description.to_string(),
            positions,
            coverage_areas,
        })
    }

    /// Builds one track per fetched recording, ids assigned by input order.
    pub fn build_all(&self, recordings: &[RecordingMetadata]) -> StageResult<Vec<Track>> {
        recordings
            .iter()
            .enumerate()
            .map(|(index, recording)| {
                let global = &recording.global;
                self.build(
                    index,
                    &global.origin.account,
                    &global.origin.container,
                    &global.description,
                    global.geotrack.coordinates.clone(),
                )
            })
            .collect()
    }
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self::new(TrackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recording() -> RecordingMetadata {
        serde_json::from_value(serde_json::json!({
            "global": {
                "iqengine:geotrack": {
                    "coordinates": [
                        [0.0, 0.0, 0.0],
                        [10.0, 20.0, 500_000.0],
                        [10.001, 20.001, 500_000.0],
                        [50.0, 50.0, 500_000.0]
                    ]
                },
                "traceability:origin": { "account": "rfdx4rp5", "container": "kleos-data" },
                "core:description": "capture pass"
            }
        }))
        .unwrap()
    }

    #[test]
    fn builder_assembles_named_track_with_swapped_positions() {
        let tracks = TrackBuilder::default()
            .build_all(&[sample_recording()])
            .unwrap();
        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.id, 0);
        assert_eq!(track.name, "rfdx4rp5/kleos-data");
        assert_eq!(track.description, "capture pass");
        // (lat, lon), sentinel and the far jump filtered out.
        assert_eq!(track.positions, vec![(20.0, 10.0), (20.001, 10.001)]);
    }

    #[test]
    fn positions_and_coverage_always_pair_up() {
        let tracks = TrackBuilder::default()
            .build_all(&[sample_recording(), RecordingMetadata::default()])
            .unwrap();
        for track in &tracks {
            assert_eq!(track.positions.len(), track.coverage_areas.len());
        }
        assert!(tracks[1].positions.is_empty());
        assert_eq!(tracks[1].id, 1);
    }

    #[test]
    fn mean_coverage_of_empty_track_is_zero() {
        let track = Track {
            id: 0,
            name: "a/b".into(),
            description: String::new(),
            positions: Vec::new(),
            coverage_areas: Vec::new(),
        };
        assert_eq!(track.mean_coverage_km2(), 0.0);
    }
}
