//! Index file format
//!
//! The index (staging area) records which content the next commit will hold.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "JIDX" (4 bytes)
//!   - Version: 1 (4 bytes, big-endian)
//!   - Entry count (4 bytes, big-endian)
//!
//! Entries (variable length):
//!   - ctime, ctime_nsec, mtime, mtime_nsec, mode, size (6 x 4 bytes)
//!   - blob id (20 bytes)
//!   - flags: path length (2 bytes)
//!   - path, NUL terminated, padded with NULs to 8-byte alignment
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "JIDX";

/// Index file format version
pub const VERSION: u32 = 1;
