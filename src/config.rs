//! Engine configuration.
//!
//! Loaded from JSON (or TOML with the `toml` feature), or assembled with the
//! `with_*` setters.
use crate::compute::codec::DEFAULT_PRECISION;
use crate::compute::validation::MAX_PRECISION;
use crate::error::{GeoproxError, Result};
use crate::query::bbox::DEFAULT_NEARBY_LIMIT;
use serde::de::Error;

/// Over-fetch factors above this trade a lot of scan work for little gain.
const LARGE_OVER_FETCH: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Geohash length used when the engine encodes coordinates.
    #[serde(default = "EngineConfig::default_precision")]
    pub precision: usize,

    /// Candidate window multiplier for proximity queries.
    #[serde(default = "EngineConfig::default_over_fetch")]
    pub over_fetch: f64,

    /// Default result cap for radius searches.
    #[serde(default = "EngineConfig::default_nearby_limit")]
    pub nearby_limit: usize,

    /// Field name the store orders by in proximity scans.
    #[serde(default = "EngineConfig::default_geohash_field")]
    pub geohash_field: String,
}

impl EngineConfig {
    const fn default_precision() -> usize {
        DEFAULT_PRECISION
    }

    const fn default_over_fetch() -> f64 {
        1.0
    }

    const fn default_nearby_limit() -> usize {
        DEFAULT_NEARBY_LIMIT
    }

    fn default_geohash_field() -> String {
        "geohash".to_string()
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_over_fetch(mut self, factor: f64) -> Self {
        if factor > LARGE_OVER_FETCH {
            log::warn!(
                "Over-fetch factor {} makes every proximity query scan {}x its limit per side",
                factor,
                factor
            );
        }
        self.over_fetch = factor;
        self
    }

    pub fn with_nearby_limit(mut self, limit: usize) -> Self {
        self.nearby_limit = limit;
        self
    }

    pub fn with_geohash_field(mut self, field: impl Into<String>) -> Self {
        self.geohash_field = field.into();
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(format!(
                "Precision must be between 1 and {}, got {}",
                MAX_PRECISION, self.precision
            ));
        }

        if !self.over_fetch.is_finite() || self.over_fetch < 1.0 {
            return Err(format!(
                "Over-fetch factor must be a finite number >= 1, got {}",
                self.over_fetch
            ));
        }

        if self.nearby_limit == 0 {
            return Err("Nearby limit must be greater than zero".to_string());
        }

        if self.geohash_field.is_empty() {
            return Err("Geohash field name must not be empty".to_string());
        }

        Ok(())
    }

    pub fn check(&self) -> Result<()> {
        self.validate().map_err(GeoproxError::Config)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reads a config file, picking the format from its extension.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GeoproxError::Config(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "toml")]
            Some("toml") => Self::from_toml(&text).map_err(|e| GeoproxError::Config(e.to_string())),
            _ => Self::from_json(&text).map_err(|e| GeoproxError::Config(e.to_string())),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: Self::default_precision(),
            over_fetch: Self::default_over_fetch(),
            nearby_limit: Self::default_nearby_limit(),
            geohash_field: Self::default_geohash_field(),
        }
    }
}
