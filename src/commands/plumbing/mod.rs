//! Plumbing commands (low-level object access)
//!
//! - `hash-object`: Compute object ID and optionally store in database
//! - `cat-file`: Decode a stored object
//! - `ls-tree`: List the files of a tree or commit

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;

use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::{Revision, resolve_object_id};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{JitError, Result};

/// An object id (full or abbreviated), falling back to a revision expression
fn resolve_object(repository: &Repository, expression: &str) -> Result<ObjectId> {
    match resolve_object_id(repository, expression, None) {
        Err(JitError::UnknownRevision(_)) => Revision::try_parse(expression)?.resolve(repository),
        resolved => resolved,
    }
}
