//! Wire types for recording metadata and data sources.
//!
//! Deserialization is deliberately loose: fields default when absent and
//! unknown fields are ignored, matching the backend's shallow-copy contract.

use crate::math::geodesy::GeoCoordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One recording as returned by the datasource query endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingMetadata {
    #[serde(default)]
    pub global: GlobalMetadata,
    #[serde(default)]
    pub captures: Vec<Capture>,
}

/// One capture segment of a recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capture {
    #[serde(rename = "core:datetime", default)]
    pub datetime: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The namespaced `global` block of a recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMetadata {
    #[serde(rename = "iqengine:geotrack", default)]
    pub geotrack: Geotrack,
    #[serde(rename = "traceability:origin", default)]
    pub origin: TraceabilityOrigin,
    #[serde(rename = "core:description", default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ordered sub-satellite coordinates attached to a recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geotrack {
    #[serde(default)]
    pub coordinates: Vec<GeoCoordinate>,
}

/// Identifies which data source produced an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityOrigin {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub file_path: String,
}

/// An account/container-scoped collection of recordings. The client moves
/// these opaquely; unknown fields survive a round trip via `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
