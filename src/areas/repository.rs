//! Explicit repository handle
//!
//! A `Repository` ties together the areas of one repository: the object
//! database, the index, the refs and the working directory. Nothing is global;
//! every operation goes through a handle opened for a specific root.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::lock::{LOCK_FILE_NAME, RepositoryLock};
use crate::areas::refs::Refs;
use crate::areas::workspace::{REPOSITORY_DIR_NAME, Workspace};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{JitError, Result};
use std::cell::{RefCell, RefMut};
use std::path::Path;

pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Handle for a repository rooted at `path`, which need not exist yet
    pub(crate) fn at(path: &Path) -> Self {
        let git_path = path.join(REPOSITORY_DIR_NAME);

        Repository {
            path: path.into(),
            index: RefCell::new(Index::new(git_path.join("index").into_boxed_path())),
            database: Database::new(git_path.join("objects").into_boxed_path()),
            workspace: Workspace::new(path.into()),
            refs: Refs::new(git_path.into_boxed_path()),
        }
    }

    /// Open the repository whose root is exactly `path`
    pub fn open(path: &Path) -> Result<Self> {
        let path = path
            .canonicalize()
            .map_err(|_| JitError::NotARepository(path.to_path_buf()))?;

        if !path.join(REPOSITORY_DIR_NAME).is_dir() {
            return Err(JitError::NotARepository(path));
        }

        Ok(Self::at(&path))
    }

    /// Open the closest repository at or above `start`
    pub fn discover(start: &Path) -> Result<Self> {
        let start = start
            .canonicalize()
            .map_err(|_| JitError::NotARepository(start.to_path_buf()))?;

        start
            .ancestors()
            .find(|candidate| candidate.join(REPOSITORY_DIR_NAME).is_dir())
            .map(Self::at)
            .ok_or(JitError::NotARepository(start))
    }

    /// Worktree root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `.jit` directory
    pub fn git_path(&self) -> Box<Path> {
        self.path.join(REPOSITORY_DIR_NAME).into_boxed_path()
    }

    pub fn index(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Take the exclusive lock every mutating command holds
    pub fn lock(&self) -> Result<RepositoryLock> {
        RepositoryLock::acquire(&self.git_path().join(LOCK_FILE_NAME))
    }

    /// Tree of the commit HEAD resolves to, `None` on an unborn branch
    pub fn head_tree(&self) -> Result<Option<ObjectId>> {
        match self.refs.head_commit()? {
            Some(oid) => {
                let commit = self.database.parse_object_as_commit(&oid)?;
                Ok(Some(commit.tree_oid().clone()))
            }
            None => Ok(None),
        }
    }
}
