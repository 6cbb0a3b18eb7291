//! Command implementations
//!
//! - `plumbing`: Low-level commands for direct object access (hash-object, cat-file, ls-tree)
//! - `porcelain`: User-facing workflows (add, commit, log, checkout, ...)

pub mod plumbing;
pub mod porcelain;
