//! Stored object types
//!
//! Two kinds of objects live in the content store:
//!
//! - **Blob**: the text content of one file at one point in time
//! - **Commit**: a full snapshot of tracked paths with message, timestamp and parents
//!
//! Objects serialize to `<type> <size>\0<content>` and are written zlib-compressed.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
