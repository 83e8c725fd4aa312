//! Argument validation for coordinates, precisions, limits and radii.

use crate::error::{GeoproxError, Result};

/// Longest geohash the codec produces (60 bits of interleaved coordinates).
pub const MAX_PRECISION: usize = 12;

/// Validates a latitude/longitude pair.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use geoprox::compute::validation::validate_coordinate;
///
/// assert!(validate_coordinate(40.7128, -74.0060).is_ok());
/// assert!(validate_coordinate(95.0, -74.0).is_err());
/// assert!(validate_coordinate(40.0, 200.0).is_err());
/// assert!(validate_coordinate(f64::NAN, 0.0).is_err());
/// ```
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() {
        return Err(GeoproxError::InvalidCoordinate(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !longitude.is_finite() {
        return Err(GeoproxError::InvalidCoordinate(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoproxError::InvalidCoordinate(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoproxError::InvalidCoordinate(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    Ok(())
}

/// Validates a geohash precision (1..=12).
pub fn validate_precision(precision: usize) -> Result<()> {
    if precision == 0 {
        return Err(GeoproxError::InvalidArgument(
            "Precision must be positive".to_string(),
        ));
    }
    if precision > MAX_PRECISION {
        return Err(GeoproxError::InvalidArgument(format!(
            "Precision {} exceeds maximum of {}",
            precision, MAX_PRECISION
        )));
    }
    Ok(())
}

pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(GeoproxError::InvalidArgument(
            "Limit must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Validates a search radius in meters.
///
/// ```
/// use geoprox::compute::validation::validate_radius;
///
/// assert!(validate_radius(1000.0).is_ok());
/// assert!(validate_radius(0.0).is_err());
/// assert!(validate_radius(-100.0).is_err());
/// assert!(validate_radius(f64::INFINITY).is_err());
/// ```
pub fn validate_radius(meters: f64) -> Result<()> {
    if !meters.is_finite() {
        return Err(GeoproxError::InvalidArgument(format!(
            "Radius must be finite, got: {}",
            meters
        )));
    }
    if meters <= 0.0 {
        return Err(GeoproxError::InvalidArgument(format!(
            "Radius must be positive, got: {}",
            meters
        )));
    }
    const EARTH_CIRCUMFERENCE: f64 = 40_075_000.0; // meters
    if meters > EARTH_CIRCUMFERENCE {
        return Err(GeoproxError::InvalidArgument(format!(
            "Radius {} exceeds Earth's circumference ({} meters)",
            meters, EARTH_CIRCUMFERENCE
        )));
    }
    Ok(())
}
