use crate::math::geodesy::GeoCoordinate;
use crate::metadata::RecordingMetadata;
use crate::prelude::{StageError, StageResult};
use crate::telemetry::log::LogManager;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Thresholds for the recording quality checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Largest tolerated heading change between consecutive hops, in degrees.
    pub max_turn_deg: f64,
    /// Largest tolerated gap between consecutive capture timestamps, in seconds.
    pub max_gap_seconds: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            max_turn_deg: 30.0,
            max_gap_seconds: 2.0,
        }
    }
}

/// Per-recording quality flags. Each flag is raised at most once per
/// recording, however many offending samples it contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordingQuality {
    pub out_of_order: bool,
    pub time_gap: bool,
    pub zero_point: bool,
    pub sharp_turn: bool,
}

impl RecordingQuality {
    pub fn is_clean(&self) -> bool {
        !(self.out_of_order || self.time_gap || self.zero_point || self.sharp_turn)
    }
}

/// Counts of flagged recordings across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualitySummary {
    pub recordings: usize,
    pub out_of_order: usize,
    pub time_gap: usize,
    pub zero_point: usize,
    pub sharp_turn: usize,
}

impl QualitySummary {
    pub fn absorb(&mut self, quality: &RecordingQuality) {
        self.recordings += 1;
        if quality.out_of_order {
            self.out_of_order += 1;
        }
        if quality.time_gap {
            self.time_gap += 1;
        }
        if quality.zero_point {
            self.zero_point += 1;
        }
        if quality.sharp_turn {
            self.sharp_turn += 1;
        }
    }
}

/// Heading change at `b` between the hops `a -> b` and `b -> c`, in degrees.
/// Zero for a straight continuation, 180 for a reversal. Degenerate hops
/// (repeated points) count as straight.
pub fn turn_angle_deg(a: &GeoCoordinate, b: &GeoCoordinate, c: &GeoCoordinate) -> f64 {
    let v1 = (b.lon - a.lon, b.lat - a.lat);
    let v2 = (c.lon - b.lon, c.lat - b.lat);
    let norm1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let norm2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }
    let cos_theta = ((v1.0 * v2.0 + v1.1 * v2.1) / (norm1 * norm2)).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

/// Validates recordings against the capture-timeline and geometry checks:
/// `core:datetime` ordering, gaps between captures, interior zero-point
/// fixes, and heading changes too sharp for a ground track.
pub struct QualityChecker {
    config: QualityConfig,
    logger: LogManager,
}

impl QualityChecker {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    pub fn check(&self, recording: &RecordingMetadata) -> StageResult<RecordingQuality> {
        let mut quality = RecordingQuality::default();

        let mut last = None;
        for capture in &recording.captures {
            let current = DateTime::parse_from_rfc3339(&capture.datetime).map_err(|err| {
                StageError::InvalidInput(format!(
                    "bad core:datetime '{}': {}",
                    capture.datetime, err
                ))
            })?;
            if let Some(previous) = last {
                if current < previous {
                    quality.out_of_order = true;
                } else if (current - previous).num_milliseconds() as f64 / 1000.0
                    > self.config.max_gap_seconds
                {
                    quality.time_gap = true;
                }
            }
            last = Some(current);
        }

        // Interior points only, matching the windowed geometry walk.
        for window in recording.global.geotrack.coordinates.windows(3) {
            if window[1].is_sentinel() {
                quality.zero_point = true;
            } else if turn_angle_deg(&window[0], &window[1], &window[2]) > self.config.max_turn_deg
            {
                quality.sharp_turn = true;
            }
        }

        if !quality.is_clean() {
            self.logger.record_warning(&format!(
                "recording {}/{} flagged: {:?}",
                recording.global.origin.account, recording.global.origin.container, quality
            ));
        }

        Ok(quality)
    }

    pub fn check_all(&self, recordings: &[RecordingMetadata]) -> StageResult<QualitySummary> {
        let mut summary = QualitySummary::default();
        for recording in recordings {
            summary.absorb(&self.check(recording)?);
        }
        self.logger.record(&format!(
            "quality check over {} recordings: {} out-of-order, {} time-gap, {} zero-point, {} sharp-turn",
            summary.recordings,
            summary.out_of_order,
            summary.time_gap,
            summary.zero_point,
            summary.sharp_turn
        ));
        Ok(summary)
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}
