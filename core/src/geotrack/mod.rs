pub mod coverage;
pub mod filter;
pub mod quality;
pub mod track;

pub use coverage::CoverageStage;
pub use filter::FilterStage;
pub use quality::{QualityChecker, QualityConfig, QualitySummary, RecordingQuality};
pub use track::{Track, TrackBuilder};
