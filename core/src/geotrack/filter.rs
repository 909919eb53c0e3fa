use crate::math::geodesy::{haversine_km, GeoCoordinate};
use crate::prelude::{
    GeotrackStage, StageError, StageInput, StageMetadata, StageOutput, StageResult, TrackConfig,
};
use crate::telemetry::log::LogManager;

/// Sentinel removal and distance-gated filtering of a ground track.
///
/// A single forward pass drops (0, 0) placeholder fixes and suppresses
/// spurious jumps: a coordinate is retained only when the last retained
/// coordinate is within `max_hop_km`, and rejected coordinates never advance
/// that cursor.
pub struct FilterStage {
    config: Option<TrackConfig>,
    logger: LogManager,
}

impl FilterStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new()
    }
}

impl GeotrackStage for FilterStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let total = input.coordinates.len();
        let mut retained = Vec::with_capacity(total);
        let mut cursor: Option<GeoCoordinate> = None;

        for coordinate in input.coordinates {
            if coordinate.is_sentinel() {
                continue;
            }
            let accepted = match cursor {
                None => true,
                Some(ref last) => haversine_km(last, &coordinate) <= config.max_hop_km,
            };
            if accepted {
                cursor = Some(coordinate);
                retained.push(coordinate);
            }
        }

        let dropped = total - retained.len();
        self.logger.record(&format!(
            "FilterStage retained {} of {} coordinates",
            retained.len(),
            total
        ));

        let metadata = StageMetadata {
            dropped: Some(dropped),
            notes: vec![format!("hop threshold {:.2} km", config.max_hop_km)],
            ..Default::default()
        };

        Ok(StageOutput {
            coordinates: retained,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(coordinates: Vec<[f64; 3]>) -> StageOutput {
        let mut stage = FilterStage::new();
        stage.initialize(&TrackConfig::default()).unwrap();
        let input = StageInput {
            coordinates: coordinates.into_iter().map(GeoCoordinate::from).collect(),
        };
        let output = stage.execute(input).unwrap();
        stage.cleanup();
        output
    }

    #[test]
    fn filter_drops_sentinel_and_far_jump() {
        let output = run(vec![
            [0.0, 0.0, 0.0],
            [10.0, 20.0, 5000.0],
            [10.001, 20.001, 5000.0],
            [50.0, 50.0, 5000.0],
        ]);
        assert_eq!(output.coordinates.len(), 2);
        assert_eq!(output.coordinates[0].lon, 10.0);
        assert_eq!(output.coordinates[1].lon, 10.001);
        assert_eq!(output.metadata.dropped, Some(2));
    }

    #[test]
    fn sentinel_never_survives_regardless_of_position() {
        let output = run(vec![
            [10.0, 20.0, 5000.0],
            [0.0, 0.0, 7000.0],
            [10.01, 20.01, 5000.0],
        ]);
        assert!(output.coordinates.iter().all(|c| !c.is_sentinel()));
        assert_eq!(output.coordinates.len(), 2);
    }

    #[test]
    fn rejected_coordinate_does_not_advance_cursor() {
        // The far point is rejected; the following point is judged against
        // the first point, not the rejected one, so it is retained.
        let output = run(vec![
            [10.0, 20.0, 5000.0],
            [50.0, 50.0, 5000.0],
            [10.001, 20.001, 5000.0],
        ]);
        assert_eq!(output.coordinates.len(), 2);
        assert_eq!(output.coordinates[1].lon, 10.001);
    }

    #[test]
    fn adjacent_retained_pairs_stay_within_threshold() {
        let output = run(vec![
            [10.0, 20.0, 5000.0],
            [10.02, 20.02, 5000.0],
            [10.04, 20.04, 5000.0],
            [11.0, 21.0, 5000.0],
        ]);
        for pair in output.coordinates.windows(2) {
            assert!(haversine_km(&pair[0], &pair[1]) <= TrackConfig::default().max_hop_km);
        }
    }

    #[test]
    fn leading_sentinels_leave_cursor_empty() {
        let output = run(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [120.0, -30.0, 5000.0]]);
        assert_eq!(output.coordinates.len(), 1);
        assert_eq!(output.coordinates[0].lat, -30.0);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let output = run(vec![]);
        assert!(output.coordinates.is_empty());
        assert_eq!(output.metadata.dropped, Some(0));
    }

    #[test]
    fn uninitialized_stage_fails() {
        let mut stage = FilterStage::new();
        let result = stage.execute(StageInput {
            coordinates: vec![],
        });
        assert!(result.is_err());
    }
}
