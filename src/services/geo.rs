//! Geographic calculations

use crate::defaults::ROAD_CORRECTION_FACTOR;
use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimate road distance from straight-line distance
pub fn road_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from, to) * ROAD_CORRECTION_FACTOR
}

/// Road distance when both ends are known
pub fn road_distance_opt(from: Option<&Coordinates>, to: Option<&Coordinates>) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) => Some(road_distance(a, b)),
        _ => None,
    }
}
