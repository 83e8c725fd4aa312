//! Radius search through a latitude/longitude bounding box.
//!
//! The radius is turned into a rectangle that a store can answer with plain
//! range predicates on its latitude and longitude columns. Boxes that cross
//! the antimeridian become two longitude ranges.
//!
//! The longitude span is `lat_span / cos(latitude)`, which grows without
//! bound near the poles; no polar correction is applied.

use crate::compute::distance::distance;
use crate::compute::validation::{validate_coordinate, validate_limit, validate_radius};
use crate::error::{GeoproxError, Result};
use crate::storage::{BoxScan, ClosedRange, IndexedEntity, ScanFilter, SortedRangeProvider};
use crate::types::GeoPoint;
use smallvec::{SmallVec, smallvec};

/// Meters per degree of latitude: 69.17 statute miles of 1609.34 m.
pub const METERS_PER_DEGREE_LAT: f64 = 1609.34 * 69.1703234283616;

pub const DEFAULT_NEARBY_LIMIT: usize = 100;

/// Above this latitude the box gets very wide in longitude.
const POLAR_WARN_LATITUDE: f64 = 80.0;

/// The rectangle a radius search expands to.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchBox {
    pub origin: GeoPoint,
    pub lat_span: f64,
    pub lon_span: f64,
    pub latitude: ClosedRange,
    pub longitude: SmallVec<[ClosedRange; 2]>,
}

impl SearchBox {
    /// Expands `meters` around `(latitude, longitude)`.
    ///
    /// ```
    /// use geoprox::query::bbox::SearchBox;
    ///
    /// let b = SearchBox::around(0.0, 179.9, 50_000.0)?;
    /// assert!(b.crosses_antimeridian());
    /// assert_eq!(b.longitude[0].max, 180.0);
    /// assert_eq!(b.longitude[1].min, -180.0);
    /// # Ok::<(), geoprox::GeoproxError>(())
    /// ```
    pub fn around(latitude: f64, longitude: f64, meters: f64) -> Result<Self> {
        validate_coordinate(latitude, longitude)?;
        validate_radius(meters)?;

        if latitude.abs() > POLAR_WARN_LATITUDE {
            log::warn!(
                "Radius search at latitude {} widens to a large longitude span",
                latitude
            );
        }

        let lat_span = meters / METERS_PER_DEGREE_LAT;
        let lon_span = (lat_span / latitude.to_radians().cos()).abs();

        let lat_range = ClosedRange::new(
            (latitude - lat_span).max(-90.0),
            (latitude + lat_span).min(90.0),
        );

        let main = ClosedRange::new(
            (longitude - lon_span).max(-180.0),
            (longitude + lon_span).min(180.0),
        );
        let mut lon_ranges: SmallVec<[ClosedRange; 2]> = smallvec![main];
        if longitude + lon_span > 180.0 {
            lon_ranges.push(ClosedRange::new(-180.0, longitude + lon_span - 360.0));
        } else if longitude - lon_span < -180.0 {
            lon_ranges.push(ClosedRange::new(longitude - lon_span + 360.0, 180.0));
        }

        if lon_ranges.len() > 1 {
            log::debug!(
                "Radius search at ({}, {}) crosses the antimeridian: {:?}",
                latitude,
                longitude,
                lon_ranges
            );
        }

        Ok(Self {
            origin: GeoPoint::new(latitude, longitude),
            lat_span,
            lon_span,
            latitude: lat_range,
            longitude: lon_ranges,
        })
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.longitude.len() > 1
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude.contains(latitude) && self.longitude.iter().any(|r| r.contains(longitude))
    }

    /// The store request for this box.
    pub fn scan<'a>(&self, limit: usize, filter: &'a ScanFilter) -> BoxScan<'a> {
        BoxScan {
            latitude: self.latitude,
            longitude: self.longitude.clone(),
            origin: self.origin,
            limit,
            filter,
        }
    }
}

/// Records inside the bounding box of a radius search, nearest (in planar
/// degrees) first, at most `limit` of them.
///
/// This is a coarse filter: corners of the box lie outside the radius. Use
/// [`nearby_within`] for exact radius semantics.
///
/// # Examples
///
/// ```
/// use geoprox::query::bbox::nearby;
/// use geoprox::storage::{MemoryStore, Record, ScanFilter};
///
/// let store = MemoryStore::new();
/// store.insert(Record::new(40.7128, -74.0060))?;
/// store.insert(Record::new(40.7306, -73.9352))?;
/// store.insert(Record::new(34.0522, -118.2437))?;
///
/// let hits = nearby(&store, 40.7128, -74.0060, 10_000.0, 100, &ScanFilter::new())?;
/// assert_eq!(hits.len(), 2);
/// assert_eq!(hits[0].latitude, 40.7128);
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
pub fn nearby<P>(
    provider: &P,
    latitude: f64,
    longitude: f64,
    meters: f64,
    limit: usize,
    filter: &ScanFilter,
) -> Result<Vec<P::Entity>>
where
    P: SortedRangeProvider + ?Sized,
{
    validate_limit(limit)?;
    let search = SearchBox::around(latitude, longitude, meters)?;
    let scan = search.scan(limit, filter);

    let mut hits = provider
        .scan_box(&scan)
        .map_err(GeoproxError::data_source)?;
    hits.sort_by(|a, b| {
        scan.planar_key(a.latitude(), a.longitude())
            .total_cmp(&scan.planar_key(b.latitude(), b.longitude()))
    });
    hits.truncate(limit);
    Ok(hits)
}

/// [`nearby`] followed by an exact haversine cut at `meters`.
///
/// Survivors carry their distance from `(latitude, longitude)` and are
/// ordered by it. `limit` caps the box scan, so with a dense store some
/// in-radius records may not be seen.
pub fn nearby_within<P>(
    provider: &P,
    latitude: f64,
    longitude: f64,
    meters: f64,
    limit: usize,
    filter: &ScanFilter,
) -> Result<Vec<P::Entity>>
where
    P: SortedRangeProvider + ?Sized,
{
    let hits = nearby(provider, latitude, longitude, meters, limit, filter)?;
    let mut within: Vec<P::Entity> = hits
        .into_iter()
        .filter_map(|mut e| {
            let d = distance(latitude, longitude, e.latitude(), e.longitude());
            e.set_distance(d);
            (d <= meters).then_some(e)
        })
        .collect();
    within.sort_by(|a, b| {
        a.distance()
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance().unwrap_or(f64::INFINITY))
    });
    Ok(within)
}
