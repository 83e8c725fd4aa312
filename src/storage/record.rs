//! Field-map record used by [`MemoryStore`](super::MemoryStore).

use super::IndexedEntity;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names served by the record's own columns; extra fields may not use them.
pub const RESERVED_FIELDS: [&str; 4] = ["geohash", "latitude", "longitude", "distance"];

/// A located record with arbitrary extra fields.
///
/// `geohash`, `latitude`, `longitude` and `distance` are also visible
/// through [`IndexedEntity::field`] under those names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub geohash: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(flatten)]
    pub fields: FxHashMap<String, Value>,
}

impl Record {
    /// A record with no geohash yet; stores fill it in on insert.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            geohash: String::new(),
            latitude,
            longitude,
            distance: None,
            fields: FxHashMap::default(),
        }
    }

    pub fn with_geohash(mut self, geohash: impl Into<String>) -> Self {
        self.geohash = geohash.into();
        self
    }

    /// Adds an extra field. Reserved names are ignored.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if RESERVED_FIELDS.contains(&name.as_str()) {
            log::warn!("Ignoring extra field {:?}: the name is reserved", name);
            return self;
        }
        self.fields.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl IndexedEntity for Record {
    fn geohash(&self) -> &str {
        &self.geohash
    }

    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "geohash" => Some(Value::from(self.geohash.as_str())),
            "latitude" => Some(Value::from(self.latitude)),
            "longitude" => Some(Value::from(self.longitude)),
            "distance" => self.distance.map(Value::from),
            _ => self.fields.get(name).cloned(),
        }
    }

    fn distance(&self) -> Option<f64> {
        self.distance
    }

    fn set_distance(&mut self, meters: f64) {
        self.distance = Some(meters);
    }
}
