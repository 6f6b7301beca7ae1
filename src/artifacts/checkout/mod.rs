//! Snapshot projection onto the working tree
//!
//! Moving the working tree from one commit to another is planned first and
//! applied second:
//!
//! 1. Scan every working file for untracked files the target would overwrite
//! 2. Plan additions, modifications and deletions
//! 3. Apply deletions, then writes
//!
//! Nothing is touched when the scan finds a conflict.

pub mod conflict;
pub mod migration;
