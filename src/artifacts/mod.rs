//! Data structures and algorithms
//!
//! - `branch`: branch names and loaded branches
//! - `checkout`: snapshot projection and untracked-file conflict detection
//! - `core`: shared output utilities (pager wrapper)
//! - `log`: first-parent history traversal
//! - `merge`: split point search, three-way resolution, conflict rendering
//! - `objects`: stored object types (blob, commit)
//! - `staging`: staging file format
//! - `status`: working tree status classification

pub mod branch;
pub mod checkout;
pub mod core;
pub mod log;
pub mod merge;
pub mod objects;
pub mod staging;
pub mod status;
