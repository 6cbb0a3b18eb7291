use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::{JitError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Files whose current content is now in the index
    pub staged: Vec<PathBuf>,
    /// Tracked files gone from disk, now removed from the index
    pub removed: Vec<PathBuf>,
}

impl Repository {
    /// Stage files or whole directories, given relative to the repository root
    pub fn add(&self, paths: &[PathBuf]) -> Result<AddOutcome> {
        let _lock = self.lock()?;
        let mut index = self.index();
        index.load()?;

        // expand every pathspec before writing anything
        let mut files = Vec::new();
        let mut deletions = Vec::new();
        for path in paths {
            if Workspace::is_repository_path(path) {
                return Err(JitError::PathNotFound(path.clone()));
            }

            if self.workspace().metadata(path)?.is_some() {
                files.extend(self.workspace().list_files(Some(path))?);
                for tracked in index.entries_under_path(path) {
                    if self.workspace().stat_file(&tracked)?.is_none() {
                        deletions.push(tracked);
                    }
                }
            } else if index.is_tracked(path) {
                deletions.push(path.clone());
            } else {
                return Err(JitError::PathNotFound(path.clone()));
            }
        }

        let mut outcome = AddOutcome::default();
        for path in deletions {
            outcome.removed.extend(index.entries_under_path(&path));
            index.remove(&path);
        }
        for file in files {
            self.stage_file(&mut index, &file)?;
            outcome.staged.push(file);
        }

        index.save()?;
        tracing::info!(staged = outcome.staged.len(), removed = outcome.removed.len(), "add");

        Ok(outcome)
    }

    fn stage_file(&self, index: &mut Index, file: &Path) -> Result<()> {
        let blob = self.workspace().parse_blob(file)?;
        let stat = self
            .workspace()
            .stat_file(file)?
            .ok_or_else(|| JitError::PathNotFound(file.to_path_buf()))?;
        let oid = self.database().store(&blob)?;

        index.add(IndexEntry::new(file.to_path_buf(), oid, stat));
        Ok(())
    }
}
