//! Builder for [`ProximityEngine`].

use crate::config::EngineConfig;
use crate::engine::ProximityEngine;
use crate::error::Result;
use crate::storage::SortedRangeProvider;

/// Builder for engine configuration.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.config = self.config.with_precision(precision);
        self
    }

    pub fn over_fetch(mut self, factor: f64) -> Self {
        self.config = self.config.with_over_fetch(factor);
        self
    }

    pub fn nearby_limit(mut self, limit: usize) -> Self {
        self.config = self.config.with_nearby_limit(limit);
        self
    }

    pub fn geohash_field(mut self, field: impl Into<String>) -> Self {
        self.config = self.config.with_geohash_field(field);
        self
    }

    /// Validate the configuration and attach it to `provider`.
    pub fn build<P: SortedRangeProvider>(self, provider: P) -> Result<ProximityEngine<P>> {
        ProximityEngine::new(provider, self.config)
    }
}
