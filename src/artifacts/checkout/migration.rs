//! Moving the working directory and index from one tree to another
//!
//! A [`Migration`] starts `Clean` with the list of paths that differ between
//! the current and the target tree. Before anything is written, every one of
//! those paths is checked against the index and the working directory; a
//! single local change the checkout would lose moves the migration to
//! `DirtyBlocked` and nothing is touched. Otherwise it goes through `Applying`
//! (deletions, then writes, then the new index) and ends `Done`.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::ConflictType;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::tree_diff::PathChange;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{JitError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Clean,
    DirtyBlocked,
    Applying,
    Done,
}

pub struct Migration<'r> {
    repository: &'r Repository,
    index: &'r mut Index,
    changes: Vec<PathChange>,
    conflicts: BTreeMap<PathBuf, ConflictType>,
    state: MigrationState,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, index: &'r mut Index, changes: Vec<PathChange>) -> Self {
        Self {
            repository,
            index,
            changes,
            conflicts: BTreeMap::new(),
            state: MigrationState::Clean,
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn changes(&self) -> &[PathChange] {
        &self.changes
    }

    pub fn conflicts(&self) -> &BTreeMap<PathBuf, ConflictType> {
        &self.conflicts
    }

    /// Check for conflicts, then carry every planned change into the working
    /// directory and the index
    pub fn apply_changes(&mut self) -> Result<()> {
        self.check_conflicts()?;

        self.state = MigrationState::Applying;
        tracing::debug!(changes = self.changes.len(), "applying checkout");

        self.update_workspace()?;
        self.update_index()?;

        self.state = MigrationState::Done;
        Ok(())
    }

    fn check_conflicts(&mut self) -> Result<()> {
        let removed = self
            .changes
            .iter()
            .filter(|change| change.new.is_none())
            .map(|change| change.path.clone())
            .collect::<BTreeSet<_>>();

        for change in &self.changes {
            if let Some(conflict) = self.find_conflict(change, &removed)? {
                tracing::warn!(path = %conflict.0.display(), "{}", conflict.1);
                self.conflicts.insert(conflict.0, conflict.1);
            }
        }

        if self.conflicts.is_empty() {
            return Ok(());
        }

        self.state = MigrationState::DirtyBlocked;
        Err(JitError::UncommittedChanges(
            self.conflicts.keys().cloned().collect(),
        ))
    }

    fn find_conflict(
        &self,
        change: &PathChange,
        removed: &BTreeSet<PathBuf>,
    ) -> Result<Option<(PathBuf, ConflictType)>> {
        let path = change.path.as_path();
        let workspace = self.repository.workspace();
        let index_entry = self.index.entry_by_path(path);

        // staged content that matches neither side would be thrown away
        let index_oid = index_entry.map(|entry| &entry.oid);
        if index_oid != change.old.as_ref().map(|entry| &entry.oid)
            && index_oid != change.new.as_ref().map(|entry| &entry.oid)
        {
            return Ok(Some((path.to_path_buf(), ConflictType::StaleFile)));
        }

        if workspace.is_dir(path) {
            if change.new.is_some() && self.holds_kept_files(path, removed)? {
                return Ok(Some((path.to_path_buf(), ConflictType::StaleDirectory)));
            }
            return Ok(None);
        }

        match (index_entry, workspace.stat_file(path)?) {
            (Some(entry), Some(stat)) => {
                if !entry.stat_match(&stat) && self.content_oid(path)? != entry.oid {
                    return Ok(Some((path.to_path_buf(), ConflictType::StaleFile)));
                }
            }
            (Some(_), None) => {
                if change.new.is_some() {
                    return Ok(Some((path.to_path_buf(), ConflictType::StaleFile)));
                }
            }
            (None, Some(_)) => {
                if let Some(new) = &change.new
                    && self.content_oid(path)? != new.oid
                {
                    return Ok(Some((
                        path.to_path_buf(),
                        ConflictType::UntrackedOverwritten,
                    )));
                }
            }
            (None, None) => {
                if change.new.is_some()
                    && let Some(ancestor) = self.blocking_ancestor(path, removed)?
                {
                    return Ok(Some((ancestor, ConflictType::UntrackedOverwritten)));
                }
            }
        }

        Ok(None)
    }

    /// A directory that would have to go, but holds files the checkout keeps
    fn holds_kept_files(&self, dir: &Path, removed: &BTreeSet<PathBuf>) -> Result<bool> {
        Ok(self
            .repository
            .workspace()
            .list_files(Some(dir))?
            .iter()
            .any(|file| !removed.contains(file)))
    }

    /// A file sitting where one of the parent directories of `path` must be created
    fn blocking_ancestor(&self, path: &Path, removed: &BTreeSet<PathBuf>) -> Result<Option<PathBuf>> {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            if self.repository.workspace().stat_file(ancestor)?.is_some()
                && !removed.contains(ancestor)
            {
                return Ok(Some(ancestor.to_path_buf()));
            }
        }

        Ok(None)
    }

    fn content_oid(&self, path: &Path) -> Result<ObjectId> {
        let blob = Blob::new(self.repository.workspace().read_file(path)?);
        Ok(blob.object_id()?)
    }

    fn update_workspace(&self) -> Result<()> {
        let workspace = self.repository.workspace();

        for change in self.changes.iter().filter(|change| change.new.is_none()) {
            // a path the index no longer tracks is the user's file now
            if self.index.entry_by_path(&change.path).is_some() {
                workspace.remove_file(&change.path)?;
            }
        }

        for change in &self.changes {
            if let Some(DatabaseEntry { oid, mode }) = &change.new {
                let blob = self.repository.database().parse_object_as_blob(oid)?;
                workspace.write_file(&change.path, blob.content(), *mode)?;
            }
        }

        Ok(())
    }

    /// Only the paths the checkout touched change in the index; every other
    /// entry, staged content included, is carried over as it is
    fn update_index(&mut self) -> Result<()> {
        for change in self.changes.iter().filter(|change| change.new.is_none()) {
            self.index.remove(&change.path);
        }

        for change in &self.changes {
            if let Some(DatabaseEntry { oid, mode }) = &change.new {
                let metadata = self
                    .repository
                    .workspace()
                    .stat_file(&change.path)?
                    .unwrap_or_else(|| EntryMetadata::with_mode(*mode));

                self.index
                    .add(IndexEntry::new(change.path.clone(), oid.clone(), metadata));
            }
        }

        if self.index.is_changed() {
            self.index.save()?;
        }

        Ok(())
    }
}
