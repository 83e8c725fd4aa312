//! Pure geohash and distance computations.
//!
//! Nothing here touches a store: encoding and decoding, neighbor lookup,
//! haversine and lexicographic distance, and argument validation.

pub mod adjacency;
pub mod codec;
pub mod distance;
pub mod validation;

pub use adjacency::{adjacent, neighbors};
pub use codec::{decode, decode_bounds, encode, encode_point, validate_hash};
pub use distance::{distance, distance_between, lexicographic_distance};
