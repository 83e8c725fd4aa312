//! Configured front end over a record store.

use crate::compute::codec::encode;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::query::bbox::{nearby, nearby_within};
use crate::query::proximity::{ProximityQuery, fetch_by_distance};
use crate::storage::{ScanFilter, SortedRangeProvider};

/// Proximity queries against one store, using one configuration.
///
/// The engine holds no query state; any number of threads may share it if
/// the provider allows.
///
/// ```
/// use geoprox::{EngineBuilder, MemoryStore, Record};
///
/// let store = MemoryStore::new();
/// store.insert(Record::new(51.5074, -0.1278).with_field("name", "London"))?;
/// store.insert(Record::new(48.8566, 2.3522).with_field("name", "Paris"))?;
///
/// let engine = EngineBuilder::new().over_fetch(2.0).build(store)?;
/// let nearest = engine.fetch_near_point(50.0, 1.0, 1)?;
/// assert_eq!(nearest.len(), 1);
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
#[derive(Debug)]
pub struct ProximityEngine<P> {
    provider: P,
    config: EngineConfig,
}

impl<P: SortedRangeProvider> ProximityEngine<P> {
    pub fn new(provider: P, config: EngineConfig) -> Result<Self> {
        config.check()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Geohash of a coordinate at the configured precision.
    pub fn encode(&self, latitude: f64, longitude: f64) -> Result<String> {
        encode(latitude, longitude, self.config.precision)
    }

    /// A query around `center` carrying the configured field and over-fetch.
    pub fn query(&self, center: impl Into<String>, limit: usize) -> ProximityQuery {
        ProximityQuery::new(center, limit)
            .field(self.config.geohash_field.clone())
            .over_fetch(self.config.over_fetch)
    }

    /// Up to `limit` records nearest to the cell `center`, closest first.
    pub fn fetch_by_distance(&self, center: &str, limit: usize) -> Result<Vec<P::Entity>> {
        fetch_by_distance(&self.provider, &self.query(center, limit))
    }

    /// Like [`fetch_by_distance`](Self::fetch_by_distance) with a fully
    /// specified query.
    pub fn fetch(&self, query: &ProximityQuery) -> Result<Vec<P::Entity>> {
        fetch_by_distance(&self.provider, query)
    }

    /// Encodes the coordinate, then runs a proximity query around it.
    pub fn fetch_near_point(
        &self,
        latitude: f64,
        longitude: f64,
        limit: usize,
    ) -> Result<Vec<P::Entity>> {
        let center = self.encode(latitude, longitude)?;
        self.fetch_by_distance(&center, limit)
    }

    /// Bounding-box radius search capped at the configured nearby limit.
    pub fn nearby(&self, latitude: f64, longitude: f64, meters: f64) -> Result<Vec<P::Entity>> {
        self.nearby_with(latitude, longitude, meters, self.config.nearby_limit, &ScanFilter::new())
    }

    pub fn nearby_with(
        &self,
        latitude: f64,
        longitude: f64,
        meters: f64,
        limit: usize,
        filter: &ScanFilter,
    ) -> Result<Vec<P::Entity>> {
        nearby(&self.provider, latitude, longitude, meters, limit, filter)
    }

    /// Radius search with an exact haversine cut, closest first.
    pub fn nearby_within(
        &self,
        latitude: f64,
        longitude: f64,
        meters: f64,
    ) -> Result<Vec<P::Entity>> {
        nearby_within(
            &self.provider,
            latitude,
            longitude,
            meters,
            self.config.nearby_limit,
            &ScanFilter::new(),
        )
    }
}
