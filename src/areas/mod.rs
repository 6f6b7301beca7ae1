//! Core repository components
//!
//! - `database`: content-addressed store of blobs and commits
//! - `staging`: staged additions and removals for the next commit
//! - `refs`: branch heads and the HEAD pointer
//! - `workspace`: working tree file system operations
//! - `lock`: the per-command repository lock
//! - `repository`: the aggregate tying the areas together

pub mod database;
pub mod lock;
pub mod refs;
pub mod repository;
pub mod staging;
pub mod workspace;
