//! Builds nested tree objects out of the flat, path-keyed index
//!
//! Index entries are grouped into directory buckets by path component. Trees
//! are then written bottom-up: every subtree is stored before the tree that
//! names it, so a root id is only ever handed out once all of its children are
//! in the object store.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{JitError, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
enum TreeNode {
    File(DatabaseEntry),
    Directory(Directory),
}

#[derive(Debug, Clone, Default)]
struct Directory {
    children: BTreeMap<String, TreeNode>,
}

/// In-memory directory hierarchy awaiting storage
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    root: Directory,
}

impl TreeBuilder {
    /// Group index entries into nested directory buckets
    ///
    /// Fails with `PathConflict` when one path is staged both as a file and as
    /// a directory prefix of another entry.
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Result<Self> {
        let mut builder = TreeBuilder::default();

        for entry in entries {
            builder.add_entry(entry)?;
        }

        Ok(builder)
    }

    fn add_entry(&mut self, entry: &IndexEntry) -> Result<()> {
        let components = path_components(&entry.name)?;
        let Some((basename, parents)) = components.split_last() else {
            return Err(anyhow::anyhow!("Empty path staged in index").into());
        };

        let mut directory = &mut self.root;
        let mut walked = PathBuf::new();

        for parent in parents {
            walked.push(parent);
            let node = directory
                .children
                .entry(parent.to_string())
                .or_insert_with(|| TreeNode::Directory(Directory::default()));

            directory = match node {
                TreeNode::Directory(subdirectory) => subdirectory,
                TreeNode::File(_) => return Err(JitError::PathConflict(walked)),
            };
        }

        match directory.children.get(*basename) {
            Some(TreeNode::Directory(_)) => Err(JitError::PathConflict(entry.name.clone())),
            _ => {
                directory.children.insert(
                    basename.to_string(),
                    TreeNode::File(DatabaseEntry::new(entry.oid.clone(), entry.mode())),
                );
                Ok(())
            }
        }
    }

    /// Store every tree, children before parents, returning the root tree id
    ///
    /// Directories that end up without entries are pruned. With no entries at
    /// all, the empty tree is stored and returned.
    pub fn write<F>(&self, store: &mut F) -> Result<ObjectId>
    where
        F: FnMut(&Tree) -> Result<ObjectId>,
    {
        match write_directory(&self.root, store)? {
            Some(oid) => Ok(oid),
            None => store(&Tree::default()),
        }
    }
}

fn write_directory<F>(directory: &Directory, store: &mut F) -> Result<Option<ObjectId>>
where
    F: FnMut(&Tree) -> Result<ObjectId>,
{
    let mut tree = Tree::default();

    for (name, node) in &directory.children {
        let entry = match node {
            TreeNode::File(entry) => Some(entry.clone()),
            TreeNode::Directory(subdirectory) => write_directory(subdirectory, store)?
                .map(|oid| DatabaseEntry::new(oid, EntryMode::Directory)),
        };

        if let Some(entry) = entry {
            tree.insert(name.clone(), entry)?;
        }
    }

    if tree.is_empty() {
        return Ok(None);
    }

    store(&tree).map(Some)
}

fn path_components(path: &Path) -> Result<Vec<&str>> {
    path.components()
        .map(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .ok_or_else(|| JitError::from(anyhow::anyhow!("Non UTF-8 path {}", path.display()))),
            _ => Err(JitError::from(anyhow::anyhow!(
                "Index path {} is not normalized",
                path.display()
            ))),
        })
        .collect()
}
