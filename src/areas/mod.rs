//! Core repository components
//!
//! - `database`: content-addressable object store
//! - `index`: staging area
//! - `lock`: repository-wide advisory lock
//! - `refs`: branches, tags and HEAD
//! - `repository`: the handle tying the areas together
//! - `workspace`: working directory file access

pub mod database;
pub mod index;
pub mod lock;
pub mod refs;
pub mod repository;
pub mod workspace;
