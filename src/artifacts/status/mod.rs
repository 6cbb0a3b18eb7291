//! Working tree status
//!
//! - `inspector`: finds files the index does not know about
//! - `status_info`: the three-way report (HEAD, index, working directory)

pub mod inspector;
pub mod status_info;
