//! Typed failures surfaced by the core
//!
//! Every core operation returns [`Result`], whose error side is [`JitError`].
//! Internal plumbing is free to use `anyhow::Context` for extra detail: the
//! `From<anyhow::Error>` conversion below recovers a typed `JitError` from the
//! chain whenever one is present, so `?` never erases the error kind.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JitError>;

#[derive(Debug, Error)]
pub enum JitError {
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("object {oid} is corrupt: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    #[error("object {oid} is a {actual}, expected a {expected}")]
    ObjectTypeMismatch {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("reference {0} not found")]
    RefNotFound(String),

    #[error("a branch named '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("tag '{0}' already exists")]
    TagAlreadyExists(String),

    #[error("'{0}' is not a valid reference name")]
    InvalidRefName(String),

    #[error("cannot delete branch '{0}' checked out at HEAD")]
    CannotDeleteCurrentBranch(String),

    #[error("your local changes to the following files would be overwritten by checkout:\n{}", format_paths(.0))]
    UncommittedChanges(Vec<PathBuf>),

    #[error("path '{}' is staged both as a file and as a directory", .0.display())]
    PathConflict(PathBuf),

    #[error("cannot commit while HEAD is detached; create a branch first")]
    DetachedHeadCommit,

    #[error("index file is corrupt: {0}")]
    IndexCorrupt(String),

    #[error("path '{}' is not staged", .0.display())]
    NotStaged(PathBuf),

    #[error("pathspec '{}' did not match any files", .0.display())]
    PathNotFound(PathBuf),

    #[error("unknown revision '{0}'")]
    UnknownRevision(String),

    #[error("short object id {prefix} is ambiguous ({} candidates)", .candidates.len())]
    AmbiguousRevision {
        prefix: String,
        candidates: Vec<ObjectId>,
    },

    #[error("aborting commit due to empty commit message")]
    EmptyCommitMessage,

    #[error("not a jit repository (or any of the parent directories): {}", .0.display())]
    NotARepository(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl JitError {
    /// Process exit code reported by the command-line layer.
    pub fn exit_code(&self) -> i32 {
        match self {
            JitError::ObjectNotFound(_) => 10,
            JitError::CorruptObject { .. } => 11,
            JitError::RefNotFound(_) => 12,
            JitError::BranchAlreadyExists(_) => 13,
            JitError::CannotDeleteCurrentBranch(_) => 14,
            JitError::UncommittedChanges(_) => 15,
            JitError::PathConflict(_) => 16,
            JitError::DetachedHeadCommit => 17,
            JitError::IndexCorrupt(_) => 18,
            JitError::NotARepository(_) => 19,
            _ => 1,
        }
    }

    pub(crate) fn corrupt(oid: &ObjectId, reason: impl Into<String>) -> Self {
        JitError::CorruptObject {
            oid: oid.clone(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for JitError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<JitError>() {
            Ok(error) => error,
            Err(error) => JitError::Other(error),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("\t{}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
