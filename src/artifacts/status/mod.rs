//! Working tree status
//!
//! - `file_change`: how an unstaged modification shows up
//! - `status_info`: classification of every path into the status sections

pub mod file_change;
pub mod status_info;
