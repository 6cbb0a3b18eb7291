//! One side of a file-level diff
//!
//! A side is either a stored blob or a working-directory file, or nothing at
//! all when the path was added or removed.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use bytes::Bytes;
use std::path::{Path, PathBuf};

pub const NULL_OID: &str = "0000000";
pub const NULL_PATH: &str = "/dev/null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTarget {
    pub path: PathBuf,
    pub oid: Option<ObjectId>,
    pub mode: Option<EntryMode>,
    pub data: Bytes,
}

impl DiffTarget {
    /// Load the side from the object store
    pub fn from_database(
        path: &Path,
        entry: Option<&DatabaseEntry>,
        database: &Database,
    ) -> Result<Self> {
        match entry {
            Some(entry) => Ok(Self {
                path: path.to_path_buf(),
                oid: Some(entry.oid.clone()),
                mode: Some(entry.mode),
                data: database.parse_object_as_blob(&entry.oid)?.into_content(),
            }),
            None => Ok(Self::missing(path)),
        }
    }

    /// Load the side from the working directory; `entry` is the file as hashed
    /// by the workspace snapshot
    pub fn from_workspace(
        path: &Path,
        entry: Option<&DatabaseEntry>,
        workspace: &Workspace,
    ) -> Result<Self> {
        match entry {
            Some(entry) => Ok(Self {
                path: path.to_path_buf(),
                oid: Some(entry.oid.clone()),
                mode: Some(entry.mode),
                data: workspace.read_file(path)?,
            }),
            None => Ok(Self::missing(path)),
        }
    }

    fn missing(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            oid: None,
            mode: None,
            data: Bytes::new(),
        }
    }

    pub fn exists(&self) -> bool {
        self.oid.is_some()
    }

    pub fn short_oid(&self) -> String {
        self.oid
            .as_ref()
            .map(ObjectId::to_short_oid)
            .unwrap_or_else(|| NULL_OID.to_string())
    }

    /// `a/<path>` style name, or `/dev/null` for a missing side
    pub fn display_path(&self, prefix: &str) -> String {
        if self.exists() {
            format!("{prefix}/{}", self.path.display())
        } else {
            NULL_PATH.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::objects::blob::Blob;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_side_renders_as_dev_null() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());

        let target = DiffTarget::from_database(Path::new("a.txt"), None, &database).unwrap();

        assert!(!target.exists());
        assert_eq!(target.display_path("a"), NULL_PATH);
        assert_eq!(target.short_oid(), NULL_OID);
    }

    #[test]
    fn stored_side_carries_blob_content() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let oid = database.store(&Blob::new(Bytes::from_static(b"hello\n"))).unwrap();
        let entry = DatabaseEntry::new(oid, EntryMode::File(FileMode::Regular));

        let target = DiffTarget::from_database(Path::new("a.txt"), Some(&entry), &database).unwrap();

        assert_eq!(target.data, Bytes::from_static(b"hello\n"));
        assert_eq!(target.display_path("b"), "b/a.txt");
    }
}
