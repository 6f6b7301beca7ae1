//! gitlet: a small content-addressed version control engine
//!
//! The crate is organised the same way as the command line tool that drives it:
//!
//! - `areas`: the on-disk areas of a repository (object database, staging area,
//!   branch table, working tree) and the `Repository` aggregate tying them together
//! - `artifacts`: data types and algorithms (objects, branches, checkout migrations,
//!   merge resolution, history walks, status reports)
//! - `commands`: the porcelain operations exposed to users, implemented on `Repository`
//! - `errors`: recoverable precondition failures reported as one-line diagnostics

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

/// Name of the metadata directory created at the repository root
pub const GITLET_DIR: &str = ".gitlet";

/// Branch created by `init` and checked out by default
pub const DEFAULT_BRANCH: &str = "master";
