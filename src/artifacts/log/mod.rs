//! Commit history traversal
//!
//! - `history`: first-parent walk from a commit back to the root, used by
//!   `log` and to rebuild a branch's history when it is loaded

pub mod history;
