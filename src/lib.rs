//! A local, single-user version-control engine
//!
//! Content lives in an object store addressed by SHA-1, is staged through a
//! binary index, snapshotted into trees and commits, and named by branches and
//! tags. Everything is reached through an explicit
//! [`Repository`](areas::repository::Repository) handle.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
