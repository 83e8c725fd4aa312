//! k-nearest lookup over a geohash-ordered store.
//!
//! Two scans leave the center hash in opposite directions. Their heads are
//! merged by lexicographic distance to the center into a candidate list,
//! which is then re-ranked by true haversine distance.

use crate::compute::codec::{decode, validate_hash};
use crate::compute::distance::{distance_between, hash_ordinal};
use crate::compute::validation::validate_limit;
use crate::error::{GeoproxError, Result};
use crate::storage::{IndexedEntity, RangeScan, ScanFilter, SortedRangeProvider};
use std::ops::Bound;

/// Parameters for [`fetch_by_distance`].
#[derive(Debug, Clone)]
pub struct ProximityQuery {
    /// Geohash to search around.
    pub center: String,
    /// Maximum number of results.
    pub limit: usize,
    /// Return the merge order as-is, without decoding or distance annotation.
    pub skip_decoding: bool,
    /// Each scan fetches `ceil(limit * over_fetch)` candidates.
    pub over_fetch: f64,
    /// Field the store orders by.
    pub field: String,
    pub filter: ScanFilter,
}

impl ProximityQuery {
    pub fn new(center: impl Into<String>, limit: usize) -> Self {
        Self {
            center: center.into(),
            limit,
            skip_decoding: false,
            over_fetch: 1.0,
            field: "geohash".to_string(),
            filter: ScanFilter::default(),
        }
    }

    pub fn skip_decoding(mut self, skip: bool) -> Self {
        self.skip_decoding = skip;
        self
    }

    pub fn over_fetch(mut self, factor: f64) -> Self {
        self.over_fetch = factor;
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Candidates requested from each side of the center.
    pub fn window(&self) -> usize {
        let scaled = (self.limit as f64 * self.over_fetch).ceil();
        if scaled.is_finite() && scaled >= self.limit as f64 {
            scaled as usize
        } else {
            self.limit
        }
    }

    fn validate(&self) -> Result<()> {
        validate_limit(self.limit)?;
        if self.center.is_empty() {
            return Err(GeoproxError::InvalidArgument(
                "Center geohash must not be empty".to_string(),
            ));
        }
        validate_hash(&self.center)?;
        if !self.over_fetch.is_finite() || self.over_fetch < 1.0 {
            return Err(GeoproxError::InvalidArgument(format!(
                "Over-fetch factor must be a finite number >= 1, got: {}",
                self.over_fetch
            )));
        }
        Ok(())
    }
}

/// Records nearest to the point `query.center` decodes to, closest first.
///
/// Returns at most `query.limit` records, fewer if the store holds fewer.
/// Unless `skip_decoding` is set, every result carries its haversine
/// distance from the center in meters.
///
/// The candidate window is only `limit × over_fetch` deep on each side, so
/// records that are close in space but far apart in hash order (across a
/// cell boundary) can be missed.
///
/// # Examples
///
/// ```
/// use geoprox::query::proximity::{ProximityQuery, fetch_by_distance};
/// use geoprox::storage::{IndexedEntity, MemoryStore, Record};
///
/// let store = MemoryStore::new();
/// store.insert(Record::new(48.8566, 2.3522).with_field("name", "Paris"))?;
/// store.insert(Record::new(48.8049, 2.1204).with_field("name", "Versailles"))?;
/// store.insert(Record::new(45.7640, 4.8357).with_field("name", "Lyon"))?;
///
/// let center = geoprox::encode(48.86, 2.34, 12)?;
/// let nearest = fetch_by_distance(&store, &ProximityQuery::new(center, 2))?;
///
/// assert_eq!(nearest.len(), 2);
/// assert_eq!(nearest[0].get("name").unwrap(), "Paris");
/// assert!(nearest[0].distance().unwrap() < nearest[1].distance().unwrap());
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
pub fn fetch_by_distance<P>(provider: &P, query: &ProximityQuery) -> Result<Vec<P::Entity>>
where
    P: SortedRangeProvider + ?Sized,
{
    query.validate()?;
    let center = query.center.to_ascii_lowercase();
    let window = query.window();

    log::debug!(
        "proximity scan around {} (limit {}, window {})",
        center,
        query.limit,
        window
    );

    let above = provider
        .scan_ascending(&RangeScan {
            field: &query.field,
            from: Bound::Included(center.as_str()),
            limit: window,
            filter: &query.filter,
        })
        .map_err(GeoproxError::data_source)?;
    let below = provider
        .scan_descending(&RangeScan {
            field: &query.field,
            from: Bound::Excluded(center.as_str()),
            limit: window,
            filter: &query.filter,
        })
        .map_err(GeoproxError::data_source)?;

    let mut candidates = merge_candidates(&center, above, below, window)?;

    if query.skip_decoding {
        candidates.truncate(query.limit);
        return Ok(candidates);
    }

    rank_by_distance(&center, &mut candidates)?;
    candidates.truncate(query.limit);
    Ok(candidates)
}

/// Greedy merge of two streams that both move away from `center` in hash
/// order. At each step the head with the smaller lexicographic distance
/// wins; ties go to `below`. Stops after `limit` records.
pub fn merge_candidates<E: IndexedEntity>(
    center: &str,
    above: Vec<E>,
    below: Vec<E>,
    limit: usize,
) -> Result<Vec<E>> {
    let origin = hash_ordinal(center)?;
    let keyed = |stream: Vec<E>| -> Result<Vec<(u64, E)>> {
        stream
            .into_iter()
            .map(|e| -> Result<(u64, E)> {
                let key = hash_ordinal(e.geohash())?.abs_diff(origin);
                Ok((key, e))
            })
            .collect()
    };
    let mut above = keyed(above)?.into_iter().peekable();
    let mut below = keyed(below)?.into_iter().peekable();

    let mut merged = Vec::with_capacity(limit.min(above.len() + below.len()));
    while merged.len() < limit {
        let take_above = match (above.peek(), below.peek()) {
            (Some((a, _)), Some((b, _))) => a < b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_above { above.next() } else { below.next() };
        if let Some((_, entity)) = next {
            merged.push(entity);
        }
    }
    Ok(merged)
}

/// Annotates each entity with its haversine distance from the center of
/// `center` and stably sorts ascending.
pub fn rank_by_distance<E: IndexedEntity>(center: &str, entities: &mut [E]) -> Result<()> {
    let origin = decode(center)?.point();
    for entity in entities.iter_mut() {
        let at = decode(entity.geohash())?.point();
        entity.set_distance(distance_between(&origin, &at));
    }
    entities.sort_by(|a, b| {
        let da = a.distance().unwrap_or(f64::INFINITY);
        let db = b.distance().unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::codec::encode;
    use crate::storage::{MemoryStore, Record, StoreError};
    use std::error::Error as _;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rec(hash: &str) -> Record {
        let loc = decode(hash).unwrap();
        Record::new(loc.latitude, loc.longitude).with_geohash(hash)
    }

    fn hashes(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.geohash.as_str()).collect()
    }

    fn grid_store() -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..20 {
            for j in 0..20 {
                let lat = 40.0 + i as f64 * 0.01;
                let lon = -74.0 + j as f64 * 0.01;
                store
                    .insert(Record::new(lat, lon).with_field("id", i * 20 + j))
                    .unwrap();
            }
        }
        store
    }

    #[test]
    fn test_merge_interleaves_by_hash_distance() {
        let above = vec![rec("s0002"), rec("s0005"), rec("s000z")];
        let below = vec![rec("s0000"), rec("rzzzz")];
        let merged = merge_candidates("s0001", above, below, 10).unwrap();
        // In units of the fifth digit: s0000 and s0002 are 1 away (tie goes
        // below), rzzzz is 2 away, s0005 is 4 and s000z is 34.
        assert_eq!(
            hashes(&merged),
            vec!["s0000", "s0002", "rzzzz", "s0005", "s000z"]
        );
    }

    #[test]
    fn test_merge_respects_limit_and_drains() {
        let above = vec![rec("s0002"), rec("s0003"), rec("s0004")];
        let merged = merge_candidates("s0001", above, Vec::new(), 2).unwrap();
        assert_eq!(hashes(&merged), vec!["s0002", "s0003"]);

        let merged: Vec<Record> =
            merge_candidates("s0001", Vec::new(), Vec::new(), 5).unwrap();
        assert!(merged.is_empty());
    }

    #[test]
    fn test_results_sorted_by_distance() {
        init_logger();
        let store = grid_store();
        let center = encode(40.095, -73.905, 12).unwrap();
        let results = fetch_by_distance(&store, &ProximityQuery::new(center, 15)).unwrap();

        assert_eq!(results.len(), 15);
        let distances: Vec<f64> = results.iter().map(|r| r.distance.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_result_len_is_min_of_limit_and_available() {
        let store = MemoryStore::new();
        for (lat, lon) in [(1.0, 1.0), (1.1, 1.0), (1.2, 1.1)] {
            store.insert(Record::new(lat, lon)).unwrap();
        }
        let center = encode(1.05, 1.0, 9).unwrap();
        let results = fetch_by_distance(&store, &ProximityQuery::new(&center, 10)).unwrap();
        assert_eq!(results.len(), 3);

        let results = fetch_by_distance(&store, &ProximityQuery::new(&center, 2)).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_store_is_empty_result() {
        let store = MemoryStore::new();
        let results = fetch_by_distance(&store, &ProximityQuery::new("9q8yy", 5)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_exact_center_match_is_kept() {
        let store = MemoryStore::new();
        store.insert(rec("9q8yykv")).unwrap();
        store.insert(rec("9q8yykw")).unwrap();
        let results = fetch_by_distance(&store, &ProximityQuery::new("9q8yykv", 1)).unwrap();
        assert_eq!(hashes(&results), vec!["9q8yykv"]);
        assert_eq!(results[0].distance, Some(0.0));
    }

    #[test]
    fn test_equal_distances_keep_merge_order() {
        let store = MemoryStore::new();
        for id in 0..6 {
            store
                .insert(Record::new(-33.8688, 151.2093).with_field("id", id))
                .unwrap();
        }
        let center = encode(-33.8688, 151.2093, 12).unwrap();
        let ids = |records: &[Record]| -> Vec<i64> {
            records
                .iter()
                .map(|r| r.get("id").and_then(|v| v.as_i64()).unwrap())
                .collect()
        };

        let merged = fetch_by_distance(
            &store,
            &ProximityQuery::new(&center, 6).skip_decoding(true),
        )
        .unwrap();
        let ranked = fetch_by_distance(&store, &ProximityQuery::new(&center, 6)).unwrap();

        assert_eq!(ids(&merged), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(ids(&ranked), ids(&merged));
        assert!(ranked.iter().all(|r| r.distance == Some(0.0)));
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let mut records: Vec<Record> = ["s0001", "s0002", "s0001", "s0002", "s0001"]
            .iter()
            .enumerate()
            .map(|(i, h)| rec(h).with_field("id", i))
            .collect();
        rank_by_distance("s0001", &mut records).unwrap();
        let order: Vec<u64> = records
            .iter()
            .map(|r| r.get("id").and_then(|v| v.as_u64()).unwrap())
            .collect();
        assert_eq!(order, vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn test_skip_decoding_keeps_merge_order() {
        let store = MemoryStore::new();
        for h in ["s0000", "s0002", "s0005", "s000z", "rzzzz"] {
            store.insert(rec(h)).unwrap();
        }
        let query = ProximityQuery::new("s0001", 3).skip_decoding(true);
        let results = fetch_by_distance(&store, &query).unwrap();
        assert_eq!(hashes(&results), vec!["s0000", "s0002", "rzzzz"]);
        assert!(results.iter().all(|r| r.distance.is_none()));
    }

    #[test]
    fn test_over_fetch_recovers_neighbor_across_cell_boundary() {
        // Two records straddle the 0° meridian, right next to the center,
        // but hash order puts the west one behind a run of far east records.
        let store = MemoryStore::new();
        let center = encode(10.0, 0.0001, 12).unwrap();
        let west = store.insert(Record::new(10.0, -0.0001)).unwrap();
        for k in 1..=6 {
            store
                .insert(Record::new(10.0 + k as f64 * 0.3, 0.0001))
                .unwrap();
        }

        let narrow = fetch_by_distance(&store, &ProximityQuery::new(&center, 1)).unwrap();
        let wide =
            fetch_by_distance(&store, &ProximityQuery::new(&center, 1).over_fetch(10.0)).unwrap();

        let west = store.get(west).unwrap();
        assert_eq!(wide[0].geohash, west.geohash);
        assert!(wide[0].distance.unwrap() <= narrow[0].distance.unwrap());
    }

    #[test]
    fn test_filter_is_passed_to_store() {
        let store = MemoryStore::new();
        store
            .insert(Record::new(48.85, 2.35).with_field("countryCode", "FR"))
            .unwrap();
        store
            .insert(Record::new(48.851, 2.351).with_field("countryCode", "BE"))
            .unwrap();
        let center = encode(48.851, 2.351, 12).unwrap();
        let query =
            ProximityQuery::new(center, 5).filter(ScanFilter::new().equals("countryCode", "FR"));
        let results = fetch_by_distance(&store, &query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("countryCode").unwrap(), "FR");
    }

    #[test]
    fn test_invalid_arguments() {
        let store = MemoryStore::new();
        assert!(matches!(
            fetch_by_distance(&store, &ProximityQuery::new("9q8yy", 0)),
            Err(GeoproxError::InvalidArgument(_))
        ));
        assert!(matches!(
            fetch_by_distance(&store, &ProximityQuery::new("9q8ya", 3)),
            Err(GeoproxError::InvalidHashCharacter { .. })
        ));
        assert!(matches!(
            fetch_by_distance(&store, &ProximityQuery::new("", 3)),
            Err(GeoproxError::InvalidArgument(_))
        ));
        assert!(
            fetch_by_distance(&store, &ProximityQuery::new("9q8yy", 3).over_fetch(0.5)).is_err()
        );
    }

    #[test]
    fn test_store_failure_is_data_source_error() {
        let store = MemoryStore::new();
        store.close();
        let err = fetch_by_distance(&store, &ProximityQuery::new("9q8yy", 3)).unwrap_err();
        assert!(err.is_data_source());
        let source = err.source().unwrap();
        assert_eq!(
            source.downcast_ref::<StoreError>(),
            Some(&StoreError::Closed)
        );
    }

    #[test]
    fn test_window() {
        assert_eq!(ProximityQuery::new("s", 10).window(), 10);
        assert_eq!(ProximityQuery::new("s", 10).over_fetch(2.5).window(), 25);
        assert_eq!(ProximityQuery::new("s", 3).over_fetch(1.1).window(), 4);
    }
}
