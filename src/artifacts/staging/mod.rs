//! Staging file format
//!
//! ```text
//! Header (16 bytes):
//!   - Signature: "STAG" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Addition count (4 bytes)
//!   - Removal count (4 bytes)
//!
//! Entries (variable length, additions first):
//!   - Kind: b'+' or b'-' (1 byte)
//!   - Blob id (20 bytes)
//!   - Path length (2 bytes)
//!   - Path (UTF-8, not terminated)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! All integers are big-endian.

pub mod checksum;
pub mod staged_entry;
pub mod staging_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

pub const HEADER_SIZE: usize = 16;

pub const SIGNATURE: &str = "STAG";

pub const VERSION: u32 = 1;
