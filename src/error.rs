//! Error types for geoprox.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoproxError>;

/// Boxed error produced by a data source collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum GeoproxError {
    /// Latitude or longitude outside its valid range, or not finite.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A geohash contained a character outside the base-32 alphabet.
    #[error("invalid geohash character {character:?} at position {position}")]
    InvalidHashCharacter { character: char, position: usize },

    /// Non-positive precision or limit, or an otherwise unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The record store failed a scan. The original error is kept as the source.
    #[error("data source error: {0}")]
    DataSource(#[source] BoxError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GeoproxError {
    /// Wrap a collaborator failure without altering it.
    pub fn data_source<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        GeoproxError::DataSource(err.into())
    }

    pub fn is_data_source(&self) -> bool {
        matches!(self, GeoproxError::DataSource(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_data_source_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "scan cancelled");
        let err = GeoproxError::data_source(io);

        assert!(err.is_data_source());
        let source = err.source().expect("source should be preserved");
        assert_eq!(source.to_string(), "scan cancelled");
    }

    #[test]
    fn test_display_messages() {
        let err = GeoproxError::InvalidHashCharacter {
            character: 'a',
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid geohash character 'a' at position 3"
        );

        let err = GeoproxError::InvalidArgument("limit must be positive".into());
        assert!(err.to_string().contains("limit must be positive"));
    }
}
