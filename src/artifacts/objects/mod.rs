//! Object model
//!
//! Everything the repository records is an immutable object addressed by the
//! SHA-1 digest of its canonical serialization. There are four kinds:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names, modes and child object ids)
//! - **Commit**: snapshot pointer plus author, parents and message
//! - **Tag**: reserved type tag; raw tag payloads can be stored and read back
//!
//! The canonical serialization is `<type> <size>\0<payload>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;
pub mod tree_builder;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Minimum length accepted for an abbreviated object id
pub const SHORT_OBJECT_ID_MIN_LENGTH: usize = 4;
