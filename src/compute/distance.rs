//! Great-circle distance and the lexicographic pre-filter metric.

use super::codec::char_value;
use super::validation::MAX_PRECISION;
use crate::error::Result;
use crate::types::GeoPoint;
use geo::{Distance, Haversine, HaversineMeasure};

/// Mean Earth radius (GRS80) the haversine distances are computed with, in meters.
pub fn earth_radius() -> f64 {
    HaversineMeasure::GRS80_MEAN_RADIUS.radius()
}

/// Haversine distance in meters between two coordinates given in degrees.
///
/// ```
/// use geoprox::compute::distance::distance;
///
/// let d = distance(40.7128, -74.0060, 34.0522, -118.2437);
/// assert!(d > 3_900_000.0 && d < 4_000_000.0);
/// assert_eq!(distance(10.0, 20.0, 10.0, 20.0), 0.0);
/// ```
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Haversine.distance(geo::Point::new(lon1, lat1), geo::Point::new(lon2, lat2))
}

pub fn distance_between(a: &GeoPoint, b: &GeoPoint) -> f64 {
    distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Positional value of a geohash read as a base-36 number.
///
/// Each character contributes its base-36 digit value, most significant
/// first. Hashes are right-padded with zero digits (or truncated) to
/// [`MAX_PRECISION`] digits so values of different lengths stay comparable.
/// For hashes of equal length the ordering matches string ordering.
pub fn hash_ordinal(hash: &str) -> Result<u64> {
    let mut value: u64 = 0;
    let mut digits = 0;
    for (position, ch) in hash.chars().take(MAX_PRECISION).enumerate() {
        char_value(ch, position)?;
        let digit = ch.to_digit(36).unwrap_or_default() as u64;
        value = value * 36 + digit;
        digits += 1;
    }
    for _ in digits..MAX_PRECISION {
        value *= 36;
    }
    Ok(value)
}

/// Absolute difference between the ordinals of two geohashes.
///
/// A cheap stand-in for spatial closeness: it tracks true distance inside a
/// cell but jumps at cell, pole and antimeridian boundaries.
pub fn lexicographic_distance(a: &str, b: &str) -> Result<u64> {
    Ok(hash_ordinal(a)?.abs_diff(hash_ordinal(b)?))
}
