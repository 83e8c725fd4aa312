//! In-memory, geohash-ordered record store.

use super::{BoxScan, IndexedEntity, RangeScan, Record, SortedRangeProvider};
use crate::compute::codec::{DEFAULT_PRECISION, encode, validate_hash};
use crate::compute::validation::{validate_coordinate, validate_precision};
use crate::error::Result;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::ops::Bound;
use thiserror::Error;

/// Failures reported by [`MemoryStore`] scans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store is closed")]
    Closed,
    #[error("field {0:?} is not indexed")]
    UnindexedField(String),
}

/// Records keyed by `(geohash, id)` so equal hashes keep insertion order.
type Key = (String, u64);

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<Key, Record>,
    /// id -> geohash, so the full key is known without scanning.
    ids: FxHashMap<u64, String>,
    next_id: u64,
    closed: bool,
}

/// Thread-safe in-memory store ordered by geohash.
///
/// Inserted records without a geohash get one computed from their
/// coordinates at the store's precision.
///
/// ```
/// use geoprox::storage::{MemoryStore, Record};
///
/// let store = MemoryStore::new();
/// let id = store.insert(Record::new(48.8566, 2.3522).with_field("name", "Paris"))?;
/// assert_eq!(store.len(), 1);
/// assert!(store.get(id).unwrap().geohash.starts_with("u09tv"));
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    precision: usize,
    field: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            precision: DEFAULT_PRECISION,
            field: "geohash".to_string(),
        }
    }

    pub fn with_precision(precision: usize) -> Result<Self> {
        validate_precision(precision)?;
        let mut store = Self::new();
        store.precision = precision;
        Ok(store)
    }

    /// Name the indexed field answers to in range scans.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Insert a record and return its id.
    pub fn insert(&self, mut record: Record) -> Result<u64> {
        validate_coordinate(record.latitude, record.longitude)?;
        if record.geohash.is_empty() {
            record.geohash = encode(record.latitude, record.longitude, self.precision)?;
        } else {
            validate_hash(&record.geohash)?;
            record.geohash.make_ascii_lowercase();
        }
        record.distance = None;

        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.ids.insert(id, record.geohash.clone());
        inner.records.insert((record.geohash.clone(), id), record);
        Ok(id)
    }

    pub fn insert_many<I>(&self, records: I) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = Record>,
    {
        records.into_iter().map(|r| self.insert(r)).collect()
    }

    pub fn get(&self, id: u64) -> Option<Record> {
        let inner = self.inner.read();
        let geohash = inner.ids.get(&id)?;
        inner.records.get(&(geohash.clone(), id)).cloned()
    }

    pub fn remove(&self, id: u64) -> Option<Record> {
        let mut inner = self.inner.write();
        let geohash = inner.ids.remove(&id)?;
        inner.records.remove(&(geohash, id))
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Drop all records. Later scans fail with [`StoreError::Closed`].
    pub fn close(&self) {
        let mut inner = self.inner.write();
        inner.records.clear();
        inner.ids.clear();
        inner.closed = true;
    }

    fn check(&self, inner: &Inner, field: Option<&str>) -> std::result::Result<(), StoreError> {
        if inner.closed {
            return Err(StoreError::Closed);
        }
        if let Some(field) = field
            && field != self.field
        {
            return Err(StoreError::UnindexedField(field.to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lower(bound: Bound<&str>) -> Bound<Key> {
    match bound {
        Bound::Included(h) => Bound::Included((h.to_string(), 0)),
        Bound::Excluded(h) => Bound::Excluded((h.to_string(), u64::MAX)),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn upper(bound: Bound<&str>) -> Bound<Key> {
    match bound {
        Bound::Included(h) => Bound::Included((h.to_string(), u64::MAX)),
        Bound::Excluded(h) => Bound::Excluded((h.to_string(), 0)),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl SortedRangeProvider for MemoryStore {
    type Entity = Record;
    type Error = StoreError;

    fn scan_ascending(&self, scan: &RangeScan<'_>) -> std::result::Result<Vec<Record>, StoreError> {
        let inner = self.inner.read();
        self.check(&inner, Some(scan.field))?;
        Ok(inner
            .records
            .range((lower(scan.from), Bound::Unbounded))
            .map(|(_, r)| r)
            .filter(|r| scan.filter.matches(*r))
            .take(scan.limit)
            .cloned()
            .collect())
    }

    fn scan_descending(
        &self,
        scan: &RangeScan<'_>,
    ) -> std::result::Result<Vec<Record>, StoreError> {
        let inner = self.inner.read();
        self.check(&inner, Some(scan.field))?;
        Ok(inner
            .records
            .range((Bound::Unbounded, upper(scan.from)))
            .rev()
            .map(|(_, r)| r)
            .filter(|r| scan.filter.matches(*r))
            .take(scan.limit)
            .cloned()
            .collect())
    }

    fn scan_box(&self, scan: &BoxScan<'_>) -> std::result::Result<Vec<Record>, StoreError> {
        let inner = self.inner.read();
        self.check(&inner, None)?;
        let mut hits: Vec<(f64, &Record)> = inner
            .records
            .values()
            .filter(|r| scan.contains(r.latitude(), r.longitude()))
            .filter(|r| scan.filter.matches(*r))
            .map(|r| (scan.planar_key(r.latitude, r.longitude), r))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(hits
            .into_iter()
            .take(scan.limit)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ClosedRange, ScanFilter};
    use crate::types::GeoPoint;
    use smallvec::smallvec;

    fn hashes(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.geohash.as_str()).collect()
    }

    fn store_with(hashes: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for h in hashes {
            let loc = crate::compute::codec::decode(h).unwrap();
            store
                .insert(Record::new(loc.latitude, loc.longitude).with_geohash(*h))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_insert_computes_geohash() {
        let store = MemoryStore::with_precision(7).unwrap();
        let id = store.insert(Record::new(37.7749, -122.4194)).unwrap();
        let r = store.get(id).unwrap();
        assert_eq!(r.geohash.len(), 7);
        assert!(r.geohash.starts_with("9q8yy"));
    }

    #[test]
    fn test_insert_rejects_bad_records() {
        let store = MemoryStore::new();
        assert!(store.insert(Record::new(100.0, 0.0)).is_err());
        assert!(
            store
                .insert(Record::new(0.0, 0.0).with_geohash("abc"))
                .is_err()
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_range_scans_are_ordered_and_bounded() {
        let store = store_with(&["9q8yy", "9q8yw", "9q8yz", "9q8yx", "9q8yv", "9q8yy"]);
        let filter = ScanFilter::new();

        let up = store
            .scan_ascending(&RangeScan {
                field: "geohash",
                from: Bound::Included("9q8yy"),
                limit: 10,
                filter: &filter,
            })
            .unwrap();
        assert_eq!(hashes(&up), vec!["9q8yy", "9q8yy", "9q8yz"]);

        let down = store
            .scan_descending(&RangeScan {
                field: "geohash",
                from: Bound::Excluded("9q8yy"),
                limit: 2,
                filter: &filter,
            })
            .unwrap();
        assert_eq!(hashes(&down), vec!["9q8yx", "9q8yw"]);

        let up_strict = store
            .scan_ascending(&RangeScan {
                field: "geohash",
                from: Bound::Excluded("9q8yy"),
                limit: 10,
                filter: &filter,
            })
            .unwrap();
        assert_eq!(hashes(&up_strict), vec!["9q8yz"]);
    }

    #[test]
    fn test_range_scan_applies_filter_before_limit() {
        let store = MemoryStore::new();
        for (i, lon) in [2.30, 2.31, 2.32, 2.33].iter().enumerate() {
            let country = if i % 2 == 0 { "FR" } else { "BE" };
            store
                .insert(Record::new(48.85, *lon).with_field("countryCode", country))
                .unwrap();
        }
        let filter = ScanFilter::new().equals("countryCode", "BE");
        let up = store
            .scan_ascending(&RangeScan {
                field: "geohash",
                from: Bound::Unbounded,
                limit: 10,
                filter: &filter,
            })
            .unwrap();
        assert_eq!(up.len(), 2);
        assert!(up.iter().all(|r| r.get("countryCode").unwrap() == "BE"));
    }

    #[test]
    fn test_scan_errors() {
        let store = store_with(&["u09tv"]);
        let filter = ScanFilter::new();
        let scan = RangeScan {
            field: "postcode",
            from: Bound::Unbounded,
            limit: 1,
            filter: &filter,
        };
        assert_eq!(
            store.scan_ascending(&scan).unwrap_err(),
            StoreError::UnindexedField("postcode".to_string())
        );

        store.close();
        let scan = RangeScan {
            field: "geohash",
            ..scan
        };
        assert_eq!(store.scan_descending(&scan).unwrap_err(), StoreError::Closed);
    }

    #[test]
    fn test_box_scan_orders_by_planar_key() {
        let store = MemoryStore::new();
        for (lat, lon) in [(0.0, 0.3), (0.0, 0.1), (0.2, 0.0), (5.0, 5.0)] {
            store.insert(Record::new(lat, lon)).unwrap();
        }
        let filter = ScanFilter::new();
        let scan = BoxScan {
            latitude: ClosedRange::new(-1.0, 1.0),
            longitude: smallvec![ClosedRange::new(-1.0, 1.0)],
            origin: GeoPoint::new(0.0, 0.0),
            limit: 2,
            filter: &filter,
        };
        let hits = store.scan_box(&scan).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].longitude, 0.1);
        assert_eq!(hits[1].latitude, 0.2);
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        let a = store.insert(Record::new(1.0, 1.0)).unwrap();
        let b = store.insert(Record::new(2.0, 2.0)).unwrap();
        assert!(store.remove(a).is_some());
        assert!(store.remove(a).is_none());
        assert!(store.get(a).is_none());
        assert!(store.get(b).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_by_id_with_shared_geohash() {
        let store = MemoryStore::new();
        let ids: Vec<u64> = (0..4)
            .map(|i| {
                store
                    .insert(Record::new(35.6895, 139.6917).with_field("n", i))
                    .unwrap()
            })
            .collect();

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(store.get(*id).unwrap().get("n").unwrap(), i);
        }
        assert_eq!(store.remove(ids[2]).unwrap().get("n").unwrap(), 2);
        assert_eq!(store.get(ids[3]).unwrap().get("n").unwrap(), 3);
        assert!(store.get(99).is_none());

        store.close();
        assert!(store.get(ids[0]).is_none());
    }

    #[test]
    fn test_store_is_debug() {
        let store = MemoryStore::new();
        store.insert(Record::new(1.0, 1.0)).unwrap();
        let text = format!("{:?}", store);
        assert!(text.contains("MemoryStore"));
    }
}
