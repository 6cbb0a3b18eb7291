use crate::areas::repository::Repository;
use crate::errors::{JitError, Result};
use std::path::PathBuf;

impl Repository {
    /// Drop paths (or everything under directory paths) from the index,
    /// leaving the working directory alone
    pub fn unstage(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let _lock = self.lock()?;
        let mut index = self.index();
        index.load()?;

        let mut unstaged = Vec::new();
        for path in paths {
            let matching = index.entries_under_path(path);
            if matching.is_empty() {
                return Err(JitError::NotStaged(path.clone()));
            }
            unstaged.extend(matching);
        }

        for path in &unstaged {
            index.remove(path);
        }
        index.save()?;
        tracing::info!(unstaged = unstaged.len(), "unstage");

        Ok(unstaged)
    }
}
