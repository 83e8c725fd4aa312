//! Record store abstraction for proximity queries.
//!
//! The engine never owns records. It asks a [`SortedRangeProvider`] for
//! hash-ordered or box-bounded slices of them and ranks what comes back.
//! [`MemoryStore`] is an in-process implementation.

use crate::compute::distance::distance;
use crate::error::BoxError;
use crate::types::GeoPoint;
use serde_json::Value;
use smallvec::SmallVec;
use std::ops::Bound;

mod memory;
mod record;

pub use memory::{MemoryStore, StoreError};
pub use record::Record;

/// A record carrying a geohash and the coordinates it was computed from.
pub trait IndexedEntity {
    fn geohash(&self) -> &str;

    fn latitude(&self) -> f64;

    fn longitude(&self) -> f64;

    /// Value of a named field, used by [`ScanFilter`].
    fn field(&self, name: &str) -> Option<Value>;

    /// Distance annotation in meters, set by the engine at query time.
    fn distance(&self) -> Option<f64>;

    fn set_distance(&mut self, meters: f64);

    fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude(), self.longitude())
    }

    /// Haversine distance in meters from this record's coordinates.
    fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        distance(self.latitude(), self.longitude(), latitude, longitude)
    }

    fn distance_to_entity<E: IndexedEntity + ?Sized>(&self, other: &E) -> f64 {
        self.distance_to(other.latitude(), other.longitude())
    }
}

/// One condition on a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate {
    /// Field equals the value exactly.
    Equals { field: String, value: Value },
    /// Field is a number no smaller than `value`.
    AtLeast { field: String, value: f64 },
}

impl FieldPredicate {
    pub fn matches<E: IndexedEntity + ?Sized>(&self, entity: &E) -> bool {
        match self {
            FieldPredicate::Equals { field, value } => {
                entity.field(field).as_ref() == Some(value)
            }
            FieldPredicate::AtLeast { field, value } => entity
                .field(field)
                .and_then(|v| v.as_f64())
                .is_some_and(|v| v >= *value),
        }
    }
}

/// Conjunction of field predicates applied by the store before ordering.
///
/// ```
/// use geoprox::storage::{Record, ScanFilter};
///
/// let filter = ScanFilter::new()
///     .equals("countryCode", "FR")
///     .at_least("population", 100_000.0);
///
/// let paris = Record::new(48.8566, 2.3522)
///     .with_field("countryCode", "FR")
///     .with_field("population", 2_100_000);
/// assert!(filter.matches(&paris));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFilter {
    predicates: Vec<FieldPredicate>,
}

impl ScanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(FieldPredicate::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn at_least(mut self, field: impl Into<String>, value: f64) -> Self {
        self.predicates.push(FieldPredicate::AtLeast {
            field: field.into(),
            value,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[FieldPredicate] {
        &self.predicates
    }

    pub fn matches<E: IndexedEntity + ?Sized>(&self, entity: &E) -> bool {
        self.predicates.iter().all(|p| p.matches(entity))
    }
}

/// Ordered scan over the values of one string field.
///
/// Ascending scans start at `from` and move up; descending scans start at
/// `from` and move down. `Bound::Included` keeps records equal to the pivot.
#[derive(Debug, Clone)]
pub struct RangeScan<'a> {
    pub field: &'a str,
    pub from: Bound<&'a str>,
    pub limit: usize,
    pub filter: &'a ScanFilter,
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedRange {
    pub min: f64,
    pub max: f64,
}

impl ClosedRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Bounding-box scan: `latitude` AND any of the `longitude` ranges.
///
/// Results should come back ordered by [`BoxScan::planar_key`] ascending and
/// capped at `limit`.
#[derive(Debug, Clone)]
pub struct BoxScan<'a> {
    pub latitude: ClosedRange,
    /// One range, or two when the box crosses the antimeridian.
    pub longitude: SmallVec<[ClosedRange; 2]>,
    pub origin: GeoPoint,
    pub limit: usize,
    pub filter: &'a ScanFilter,
}

impl BoxScan<'_> {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude.contains(latitude) && self.longitude.iter().any(|r| r.contains(longitude))
    }

    /// `(lat - lat0)² + (lon - lon0)²`: squared planar degrees from the origin.
    pub fn planar_key(&self, latitude: f64, longitude: f64) -> f64 {
        let dlat = latitude - self.origin.latitude;
        let dlon = longitude - self.origin.longitude;
        dlat * dlat + dlon * dlon
    }
}

/// The store capability the query layer depends on.
///
/// Implementations may block or run queries elsewhere; the engine only sees
/// the finished vectors. Any failure, including cancellation, is reported as
/// `Self::Error` and surfaces to callers as `GeoproxError::DataSource`.
pub trait SortedRangeProvider {
    type Entity: IndexedEntity;
    type Error: Into<BoxError>;

    /// Records whose `scan.field` is at or above `scan.from`, ascending.
    fn scan_ascending(&self, scan: &RangeScan<'_>) -> Result<Vec<Self::Entity>, Self::Error>;

    /// Records whose `scan.field` is at or below `scan.from`, descending.
    fn scan_descending(&self, scan: &RangeScan<'_>) -> Result<Vec<Self::Entity>, Self::Error>;

    /// Records inside the box, nearest to `scan.origin` first.
    fn scan_box(&self, scan: &BoxScan<'_>) -> Result<Vec<Self::Entity>, Self::Error>;
}

impl<P: SortedRangeProvider + ?Sized> SortedRangeProvider for &P {
    type Entity = P::Entity;
    type Error = P::Error;

    fn scan_ascending(&self, scan: &RangeScan<'_>) -> Result<Vec<Self::Entity>, Self::Error> {
        (**self).scan_ascending(scan)
    }

    fn scan_descending(&self, scan: &RangeScan<'_>) -> Result<Vec<Self::Entity>, Self::Error> {
        (**self).scan_descending(scan)
    }

    fn scan_box(&self, scan: &BoxScan<'_>) -> Result<Vec<Self::Entity>, Self::Error> {
        (**self).scan_box(scan)
    }
}
