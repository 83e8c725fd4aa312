//! Value types shared by the codec, adjacency and query layers.

use crate::error::GeoproxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair in degrees.
///
/// Latitude comes first, matching how geohashes are usually discussed.
/// Conversion to `geo::Point` swaps into `(x = longitude, y = latitude)`.
///
/// ```
/// use geoprox::GeoPoint;
///
/// let sf = GeoPoint::new(37.7749, -122.4194);
/// let p: geo::Point = sf.into();
/// assert_eq!(p.x(), -122.4194);
/// assert_eq!(p.y(), 37.7749);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.longitude, p.latitude)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(p: geo::Point<f64>) -> Self {
        GeoPoint::new(p.y(), p.x())
    }
}

/// Center of a decoded geohash cell plus its half-widths.
///
/// `error_lat` / `error_lon` bound how far the originally encoded point can
/// lie from `(latitude, longitude)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub error_lat: f64,
    pub error_lon: f64,
}

impl DecodedLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// True if `p` lies inside the decoded cell (edges inclusive).
    pub fn covers(&self, p: &GeoPoint) -> bool {
        (p.latitude - self.latitude).abs() <= self.error_lat
            && (p.longitude - self.longitude).abs() <= self.error_lon
    }

    pub fn bounds(&self) -> CellBounds {
        CellBounds {
            min_lat: self.latitude - self.error_lat,
            max_lat: self.latitude + self.error_lat,
            min_lon: self.longitude - self.error_lon,
            max_lon: self.longitude + self.error_lon,
        }
    }
}

/// Rectangle covered by a geohash cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl CellBounds {
    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::coord! { x: self.min_lon, y: self.min_lat },
            geo::coord! { x: self.max_lon, y: self.max_lat },
        )
    }
}

/// Neighbor direction. `Top` is north, `Right` is east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GeoproxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "north" => Ok(Direction::Top),
            "bottom" | "south" => Ok(Direction::Bottom),
            "left" | "west" => Ok(Direction::Left),
            "right" | "east" => Ok(Direction::Right),
            other => Err(GeoproxError::InvalidArgument(format!(
                "unknown direction: {}",
                other
            ))),
        }
    }
}
