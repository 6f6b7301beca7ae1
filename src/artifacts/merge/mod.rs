//! Three-way merge
//!
//! - `bca_finder`: split point of two heads over the full commit graph
//! - `resolution`: per-path decision between the active, incoming and split snapshots
//! - `conflict`: conflict file rendering

pub mod bca_finder;
pub mod conflict;
pub mod resolution;
