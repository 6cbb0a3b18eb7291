//! Repository-wide advisory lock
//!
//! Mutating commands take an exclusive `file-guard` lock on `.jit/lock` for
//! their whole duration, so two processes touching the same repository are
//! serialized rather than interleaved. Readers do not lock.

use crate::errors::Result;
use anyhow::Context;
use file_guard::{FileGuard, Lock};
use std::fs::File;
use std::path::Path;

pub const LOCK_FILE_NAME: &str = "lock";

/// Held for as long as the guard lives; dropping it releases the lock
pub struct RepositoryLock {
    _guard: FileGuard<Box<File>>,
}

impl RepositoryLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to open lock file at {}", path.display()))?;

        tracing::trace!(path = %path.display(), "waiting for repository lock");
        let guard = file_guard::lock(Box::new(lock_file), Lock::Exclusive, 0, 1)
            .with_context(|| format!("failed to lock {}", path.display()))?;
        tracing::trace!(path = %path.display(), "acquired repository lock");

        Ok(RepositoryLock { _guard: guard })
    }
}
