//! Database entry types
//!
//! Entries as read back from stored tree objects: a child object id and the
//! mode it is recorded with.

pub mod database_entry;
