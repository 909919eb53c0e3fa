use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Raw ground-track coordinate as carried in recording metadata.
///
/// The wire representation is a `[lon, lat, alt]` triple with degrees for the
/// angles and meters for the altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct GeoCoordinate {
    pub lon: f64,
    pub lat: f64,
    pub alt_m: f64,
}

impl GeoCoordinate {
    pub fn new(lon: f64, lat: f64, alt_m: f64) -> Self {
        Self { lon, lat, alt_m }
    }

    /// A (0, 0) placeholder marking the absence of a valid position fix.
    pub fn is_sentinel(&self) -> bool {
        self.lon == 0.0 && self.lat == 0.0
    }
}

impl From<[f64; 3]> for GeoCoordinate {
    fn from(raw: [f64; 3]) -> Self {
        Self {
            lon: raw[0],
            lat: raw[1],
            alt_m: raw[2],
        }
    }
}

impl From<GeoCoordinate> for [f64; 3] {
    fn from(coordinate: GeoCoordinate) -> Self {
        [coordinate.lon, coordinate.lat, coordinate.alt_m]
    }
}

/// Great-circle surface distance between two coordinates, in km.
pub fn haversine_km(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let dlat = lat_b - lat_a;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
