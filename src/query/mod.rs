//! Query layer: ranked lookups on top of a [`SortedRangeProvider`].
//!
//! [`SortedRangeProvider`]: crate::storage::SortedRangeProvider

pub mod bbox;
pub mod proximity;

pub use bbox::{SearchBox, nearby, nearby_within};
pub use proximity::{ProximityQuery, fetch_by_distance, merge_candidates, rank_by_distance};
