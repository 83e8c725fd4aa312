//! Geohash proximity engine: encoding, neighbor cells, haversine distance,
//! and nearest-record lookups over any store that keeps records sorted by
//! geohash.
//!
//! ```rust
//! use geoprox::{EngineBuilder, IndexedEntity, MemoryStore, Record};
//!
//! let store = MemoryStore::new();
//! store.insert(Record::new(40.7128, -74.0060).with_field("name", "New York"))?;
//! store.insert(Record::new(40.6782, -73.9442).with_field("name", "Brooklyn"))?;
//! store.insert(Record::new(34.0522, -118.2437).with_field("name", "Los Angeles"))?;
//!
//! let engine = EngineBuilder::new().over_fetch(3.0).build(store)?;
//! let nearest = engine.fetch_near_point(40.71, -74.0, 2)?;
//! assert_eq!(nearest[0].get("name").unwrap(), "New York");
//! assert!(nearest[0].distance().unwrap() < nearest[1].distance().unwrap());
//!
//! let hash = geoprox::encode(37.7749, -122.4194, 5)?;
//! assert_eq!(hash, "9q8yy");
//! # Ok::<(), geoprox::GeoproxError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod storage;
pub mod types;

pub use builder::EngineBuilder;
pub use config::EngineConfig;
pub use engine::ProximityEngine;
pub use error::{GeoproxError, Result};

pub use types::{CellBounds, DecodedLocation, Direction, GeoPoint};

pub use compute::{
    adjacent, decode, decode_bounds, distance, distance_between, encode, lexicographic_distance,
    neighbors,
};

pub use query::{ProximityQuery, SearchBox, fetch_by_distance, nearby, nearby_within};

pub use storage::{
    IndexedEntity, MemoryStore, Record, ScanFilter, SortedRangeProvider, StoreError,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{EngineBuilder, EngineConfig, GeoproxError, ProximityEngine, Result};

    pub use crate::{Direction, GeoPoint};

    pub use crate::{adjacent, decode, distance, encode, neighbors};

    pub use crate::{IndexedEntity, MemoryStore, Record, ScanFilter, SortedRangeProvider};
}
