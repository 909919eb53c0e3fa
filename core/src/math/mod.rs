pub mod geodesy;

pub use geodesy::{haversine_km, GeoCoordinate, EARTH_RADIUS_KM};
