//! Checkout planning and application
//!
//! - `conflict`: the kinds of local change that block a checkout
//! - `migration`: the conflict check and the workspace/index rewrite
//!
//! All conflicts are collected before the first file is touched, so a blocked
//! checkout leaves the working directory, the index and HEAD exactly as they
//! were.

pub mod conflict;
pub mod migration;
