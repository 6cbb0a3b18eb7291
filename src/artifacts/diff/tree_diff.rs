//! Path-level comparison between snapshots
//!
//! Stored trees are compared with [`TreeDiff`], which walks both trees side by
//! side and never opens a subtree whose id is the same on both sides. The
//! index and the working directory have no stored trees, so they are compared
//! as flat [`Snapshot`]s keyed by path instead. Both routes yield the same
//! [`PathChange`] shape, sorted by path.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File entries of a tree-like source, keyed by repository-relative path
pub type Snapshot = BTreeMap<PathBuf, DatabaseEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl ChangeKind {
    pub fn status_letter(&self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Removed => 'D',
            ChangeKind::Modified => 'M',
            ChangeKind::Unchanged => ' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub old: Option<DatabaseEntry>,
    pub new: Option<DatabaseEntry>,
}

impl PathChange {
    /// Classify a path from the entries found on each side.
    ///
    /// Only the blob id decides between `Modified` and `Unchanged`; a mode flip
    /// on its own is not a content change.
    pub fn between(
        path: PathBuf,
        old: Option<DatabaseEntry>,
        new: Option<DatabaseEntry>,
    ) -> Option<Self> {
        let kind = match (&old, &new) {
            (None, None) => return None,
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            (Some(old), Some(new)) if old.oid != new.oid => ChangeKind::Modified,
            (Some(_), Some(_)) => ChangeKind::Unchanged,
        };

        Some(PathChange {
            path,
            kind,
            old,
            new,
        })
    }
}

pub struct TreeDiff<'r> {
    database: &'r Database,
    include_unchanged: bool,
    changes: Vec<PathChange>,
}

impl<'r> TreeDiff<'r> {
    pub fn new(database: &'r Database) -> Self {
        TreeDiff {
            database,
            include_unchanged: false,
            changes: Vec::new(),
        }
    }

    /// Also report files present on both sides with the same content
    pub fn include_unchanged(mut self, include_unchanged: bool) -> Self {
        self.include_unchanged = include_unchanged;
        self
    }

    /// Compare two root trees; `None` stands for "no tree at all"
    pub fn compare(
        mut self,
        old: Option<&ObjectId>,
        new: Option<&ObjectId>,
    ) -> Result<Vec<PathChange>> {
        self.compare_oids(old, new, Path::new(""))?;

        // a file/directory swap reports the directory's children out of order
        self.changes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(self.changes)
    }

    fn compare_oids(
        &mut self,
        old: Option<&ObjectId>,
        new: Option<&ObjectId>,
        prefix: &Path,
    ) -> Result<()> {
        if old == new && !self.include_unchanged {
            return Ok(());
        }

        let old_entries = self.load_entries(old)?;
        let new_entries = self.load_entries(new)?;

        let names = old_entries
            .keys()
            .chain(new_entries.keys())
            .collect::<BTreeSet<_>>();

        for name in names {
            self.compare_entries(
                prefix.join(name),
                old_entries.get(name),
                new_entries.get(name),
            )?;
        }

        Ok(())
    }

    fn compare_entries(
        &mut self,
        path: PathBuf,
        old: Option<&DatabaseEntry>,
        new: Option<&DatabaseEntry>,
    ) -> Result<()> {
        match (old, new) {
            (None, None) => {}
            (Some(old), None) if old.is_tree() => self.compare_oids(Some(&old.oid), None, &path)?,
            (None, Some(new)) if new.is_tree() => self.compare_oids(None, Some(&new.oid), &path)?,
            (Some(old), Some(new)) => match (old.is_tree(), new.is_tree()) {
                (true, true) => self.compare_oids(Some(&old.oid), Some(&new.oid), &path)?,
                (true, false) => {
                    self.compare_oids(Some(&old.oid), None, &path)?;
                    self.record(path, None, Some(new));
                }
                (false, true) => {
                    self.compare_oids(None, Some(&new.oid), &path)?;
                    self.record(path, Some(old), None);
                }
                (false, false) => self.record(path, Some(old), Some(new)),
            },
            (old, new) => self.record(path, old, new),
        }

        Ok(())
    }

    fn record(&mut self, path: PathBuf, old: Option<&DatabaseEntry>, new: Option<&DatabaseEntry>) {
        if let Some(change) = PathChange::between(path, old.cloned(), new.cloned())
            && (self.include_unchanged || change.kind != ChangeKind::Unchanged)
        {
            self.changes.push(change);
        }
    }

    fn load_entries(&self, oid: Option<&ObjectId>) -> Result<BTreeMap<String, DatabaseEntry>> {
        match oid {
            Some(oid) => Ok(self
                .database
                .parse_object_as_tree(oid)?
                .into_entries()
                .collect()),
            None => Ok(BTreeMap::new()),
        }
    }
}

/// Changes between two stored trees, unchanged paths left out
pub fn diff_trees(
    database: &Database,
    old: Option<&ObjectId>,
    new: Option<&ObjectId>,
) -> Result<Vec<PathChange>> {
    TreeDiff::new(database).compare(old, new)
}

/// What the index would commit, relative to `tree` (usually HEAD's)
pub fn diff_index_vs_tree(
    database: &Database,
    index: &Index,
    tree: Option<&ObjectId>,
) -> Result<Vec<PathChange>> {
    let tree_snapshot = flatten_tree(database, tree)?;

    Ok(diff_snapshots(&tree_snapshot, &index_snapshot(index), false))
}

/// Edits in the working directory not yet staged. Untracked files are not
/// part of the result.
pub fn diff_workspace_vs_index(workspace: &Workspace, index: &Index) -> Result<Vec<PathChange>> {
    let workspace_snapshot = workspace_snapshot(workspace, index)?;

    Ok(diff_snapshots(
        &index_snapshot(index),
        &workspace_snapshot,
        false,
    ))
}

pub fn diff_snapshots(old: &Snapshot, new: &Snapshot, include_unchanged: bool) -> Vec<PathChange> {
    old.keys()
        .chain(new.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|path| PathChange::between(path.clone(), old.get(path).cloned(), new.get(path).cloned()))
        .filter(|change| include_unchanged || change.kind != ChangeKind::Unchanged)
        .collect()
}

/// Every file reachable from `tree`, keyed by its full path
pub fn flatten_tree(database: &Database, tree: Option<&ObjectId>) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();
    if let Some(tree) = tree {
        collect_tree(database, tree, Path::new(""), &mut snapshot)?;
    }

    Ok(snapshot)
}

fn collect_tree(
    database: &Database,
    oid: &ObjectId,
    prefix: &Path,
    snapshot: &mut Snapshot,
) -> Result<()> {
    for (name, entry) in database.parse_object_as_tree(oid)?.into_entries() {
        let path = prefix.join(name);
        if entry.is_tree() {
            collect_tree(database, &entry.oid, &path, snapshot)?;
        } else {
            snapshot.insert(path, entry);
        }
    }

    Ok(())
}

pub fn index_snapshot(index: &Index) -> Snapshot {
    index
        .entries()
        .map(|entry| {
            (
                entry.name.clone(),
                DatabaseEntry::new(entry.oid.clone(), entry.mode()),
            )
        })
        .collect()
}

/// The working directory as it would be staged, restricted to tracked paths.
///
/// Files whose size and mtime still match their index entry are trusted
/// without reading them; anything else is hashed, but nothing is stored.
pub fn workspace_snapshot(workspace: &Workspace, index: &Index) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();

    for entry in index.entries() {
        let Some(stat) = workspace.stat_file(&entry.name)? else {
            continue;
        };

        let oid = if entry.stat_match(&stat) {
            entry.oid.clone()
        } else {
            Blob::new(workspace.read_file(&entry.name)?).object_id()?
        };

        snapshot.insert(entry.name.clone(), DatabaseEntry::new(oid, stat.mode));
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
    use crate::artifacts::objects::tree_builder::TreeBuilder;
    use assert_fs::TempDir;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    struct Store {
        _dir: TempDir,
        database: Database,
    }

    #[fixture]
    fn store() -> Store {
        new_store()
    }

    fn new_store() -> Store {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());

        Store {
            _dir: dir,
            database,
        }
    }

    fn commit_tree(database: &Database, files: &[(&str, &str)]) -> ObjectId {
        let entries = files
            .iter()
            .map(|(path, content)| {
                let oid = database.store(&Blob::new(Bytes::from(content.to_string()))).unwrap();
                IndexEntry::new(
                    PathBuf::from(path),
                    oid,
                    EntryMetadata::with_mode(EntryMode::File(FileMode::Regular)),
                )
            })
            .collect::<Vec<_>>();

        TreeBuilder::build(&entries)
            .unwrap()
            .write(&mut |tree| database.store(tree))
            .unwrap()
    }

    fn summary(changes: &[PathChange]) -> Vec<(String, ChangeKind)> {
        changes
            .iter()
            .map(|change| (change.path.display().to_string(), change.kind))
            .collect()
    }

    #[rstest]
    fn identical_trees_have_no_changes(store: Store) {
        let tree = commit_tree(&store.database, &[("a.txt", "a"), ("dir/b.txt", "b")]);

        let changes = diff_trees(&store.database, Some(&tree), Some(&tree)).unwrap();

        assert!(changes.is_empty());
    }

    #[rstest]
    fn reports_nested_additions_removals_and_edits(store: Store) {
        let old = commit_tree(
            &store.database,
            &[("a.txt", "a"), ("dir/b.txt", "b"), ("dir/sub/c.txt", "c")],
        );
        let new = commit_tree(
            &store.database,
            &[("a.txt", "a2"), ("dir/sub/c.txt", "c"), ("dir/sub/d.txt", "d")],
        );

        let changes = diff_trees(&store.database, Some(&old), Some(&new)).unwrap();

        assert_eq!(
            summary(&changes),
            vec![
                ("a.txt".to_string(), ChangeKind::Modified),
                ("dir/b.txt".to_string(), ChangeKind::Removed),
                ("dir/sub/d.txt".to_string(), ChangeKind::Added),
            ]
        );
    }

    #[rstest]
    fn file_replaced_by_directory_is_removed_then_added(store: Store) {
        let old = commit_tree(&store.database, &[("a", "file")]);
        let new = commit_tree(&store.database, &[("a/b.txt", "nested")]);

        let changes = diff_trees(&store.database, Some(&old), Some(&new)).unwrap();

        assert_eq!(
            summary(&changes),
            vec![
                ("a".to_string(), ChangeKind::Removed),
                ("a/b.txt".to_string(), ChangeKind::Added),
            ]
        );
    }

    #[rstest]
    fn missing_root_tree_lists_everything_as_added(store: Store) {
        let tree = commit_tree(&store.database, &[("a.txt", "a"), ("dir/b.txt", "b")]);

        let changes = diff_trees(&store.database, None, Some(&tree)).unwrap();

        assert!(changes.iter().all(|change| change.kind == ChangeKind::Added));
        assert_eq!(changes.len(), 2);
    }

    #[rstest]
    fn unchanged_entries_are_reported_on_request(store: Store) {
        let tree = commit_tree(&store.database, &[("a.txt", "a"), ("dir/b.txt", "b")]);

        let changes = TreeDiff::new(&store.database)
            .include_unchanged(true)
            .compare(Some(&tree), Some(&tree))
            .unwrap();

        assert_eq!(
            summary(&changes),
            vec![
                ("a.txt".to_string(), ChangeKind::Unchanged),
                ("dir/b.txt".to_string(), ChangeKind::Unchanged),
            ]
        );
    }

    #[test]
    fn mode_only_difference_is_unchanged() {
        let oid = ObjectId::from_canonical_bytes(b"blob 1\0a");
        let old = DatabaseEntry::new(oid.clone(), EntryMode::File(FileMode::Regular));
        let new = DatabaseEntry::new(oid, EntryMode::File(FileMode::Executable));

        let change = PathChange::between("a".into(), Some(old), Some(new)).unwrap();

        assert_eq!(change.kind, ChangeKind::Unchanged);
    }

    #[rstest]
    fn flattening_matches_index_snapshot(store: Store) {
        let tree = commit_tree(&store.database, &[("a.txt", "a"), ("dir/b.txt", "b")]);

        let snapshot = flatten_tree(&store.database, Some(&tree)).unwrap();

        assert_eq!(
            snapshot.keys().cloned().collect::<Vec<_>>(),
            vec![PathBuf::from("a.txt"), PathBuf::from("dir/b.txt")]
        );
    }

    fn files_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map("(d1/|d2/d3/)?[a-d]\\.txt", "[xyz]{0,3}", 0..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn diffing_a_tree_with_itself_is_empty(files in files_strategy()) {
            let store = new_store();
            let files = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect::<Vec<_>>();
            let tree = commit_tree(&store.database, &files);

            prop_assert!(diff_trees(&store.database, Some(&tree), Some(&tree)).unwrap().is_empty());
        }

        #[test]
        fn swapping_sides_mirrors_the_change_kinds(
            old_files in files_strategy(),
            new_files in files_strategy(),
        ) {
            let store = new_store();
            let old_files = old_files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect::<Vec<_>>();
            let new_files = new_files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect::<Vec<_>>();
            let old = commit_tree(&store.database, &old_files);
            let new = commit_tree(&store.database, &new_files);

            let forward = diff_trees(&store.database, Some(&old), Some(&new)).unwrap();
            let backward = diff_trees(&store.database, Some(&new), Some(&old)).unwrap();

            let mirrored = forward
                .iter()
                .map(|change| {
                    let kind = match change.kind {
                        ChangeKind::Added => ChangeKind::Removed,
                        ChangeKind::Removed => ChangeKind::Added,
                        kind => kind,
                    };
                    (change.path.clone(), kind)
                })
                .collect::<Vec<_>>();
            let backward = backward
                .iter()
                .map(|change| (change.path.clone(), change.kind))
                .collect::<Vec<_>>();

            prop_assert_eq!(mirrored, backward);
        }
    }
}
