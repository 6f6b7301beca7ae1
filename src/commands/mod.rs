//! User-facing commands
//!
//! Every command is an `impl Repository` block under `porcelain`, one file per
//! command (or per closely related pair, like `branch`/`rm-branch`).

pub mod porcelain;
