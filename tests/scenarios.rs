use assert_fs::TempDir;
use assert_fs::prelude::*;
use filetime::FileTime;
use jit::areas::refs::Head;
use jit::areas::repository::Repository;
use jit::artifacts::checkout::conflict::ConflictType;
use jit::artifacts::checkout::migration::{Migration, MigrationState};
use jit::artifacts::diff::tree_diff::{ChangeKind, diff_trees};
use jit::artifacts::objects::commit::Author;
use jit::artifacts::objects::object_id::ObjectId;
use jit::errors::JitError;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::path::PathBuf;

struct Scenario {
    dir: TempDir,
    repository: Repository,
}

impl Scenario {
    fn write(&self, path: &str, content: &str) {
        self.dir.child(path).write_str(content).unwrap();
    }

    fn add(&self, paths: &[&str]) {
        let paths = paths.iter().map(PathBuf::from).collect::<Vec<_>>();
        self.repository.add(&paths).unwrap();
    }

    fn commit(&self, message: &str) -> ObjectId {
        self.repository.commit(message, author()).unwrap().oid
    }

    fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(path)).unwrap()
    }

    fn tree_of(&self, commit: &ObjectId) -> ObjectId {
        self.repository
            .database()
            .parse_object_as_commit(commit)
            .unwrap()
            .tree_oid()
            .clone()
    }
}

fn author() -> Author {
    let timestamp =
        chrono::DateTime::parse_from_str("2023-01-01 12:00:00 +0000", "%Y-%m-%d %H:%M:%S %z")
            .unwrap();
    Author::new_with_timestamp("Ada Lovelace".into(), "ada@example.com".into(), timestamp)
}

#[fixture]
fn scenario() -> Scenario {
    let dir = TempDir::new().unwrap();
    let repository = Repository::init(dir.path()).unwrap().repository;
    let scenario = Scenario { dir, repository };

    scenario.write("README.md", "readme\n");
    scenario.write("src/main.rs", "fn main() {}\n");
    scenario.add(&["README.md", "src"]);
    scenario.commit("Initial commit");

    scenario
}

#[rstest]
fn checkout_of_the_current_commit_is_empty(scenario: Scenario) {
    let before = scenario.repository.refs().head().unwrap();

    let outcome = scenario.repository.checkout("HEAD").unwrap();

    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.head, before);
    assert_eq!(scenario.repository.refs().head().unwrap(), before);
}

#[rstest]
fn feature_branch_round_trip(scenario: Scenario) {
    let repository = &scenario.repository;
    repository.create_branch("feature", None).unwrap();
    repository.checkout("feature").unwrap();

    scenario.write("src/lib.rs", "pub fn lib() {}\n");
    scenario.write("README.md", "readme, feature edition\n");
    scenario.add(&["src/lib.rs", "README.md"]);
    let feature_tip = scenario.commit("Feature");

    let outcome = repository.checkout("master").unwrap();
    let kinds = outcome
        .changes
        .iter()
        .map(|change| (change.path.clone(), change.kind))
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            (PathBuf::from("README.md"), ChangeKind::Modified),
            (PathBuf::from("src/lib.rs"), ChangeKind::Removed),
        ]
    );
    assert_eq!(scenario.read("README.md"), "readme\n");
    assert!(!scenario.dir.path().join("src/lib.rs").exists());
    assert!(repository.status().unwrap().is_clean());

    repository.checkout("feature").unwrap();

    assert_eq!(repository.refs().head_commit().unwrap(), Some(feature_tip));
    assert_eq!(scenario.read("src/lib.rs"), "pub fn lib() {}\n");
    assert!(repository.status().unwrap().is_clean());
}

#[rstest]
fn staged_change_blocks_checkout_without_touching_files(scenario: Scenario) {
    let repository = &scenario.repository;
    let master = repository.refs().head_commit().unwrap().unwrap();
    repository.create_branch("feature", None).unwrap();
    repository.checkout("feature").unwrap();
    scenario.write("README.md", "feature readme\n");
    scenario.add(&["README.md"]);
    scenario.commit("Feature readme");
    repository.checkout("master").unwrap();

    scenario.write("README.md", "staged locally\n");
    scenario.add(&["README.md"]);

    let error = repository.checkout("feature").unwrap_err();

    assert!(matches!(&error, JitError::UncommittedChanges(paths) if paths == &[PathBuf::from("README.md")]));
    assert_eq!(error.exit_code(), 15);
    assert_eq!(scenario.read("README.md"), "staged locally\n");
    assert_eq!(repository.refs().head_commit().unwrap(), Some(master));
}

#[rstest]
fn blocked_migration_reports_each_conflict(scenario: Scenario) {
    let repository = &scenario.repository;
    let root = repository.refs().head_commit().unwrap().unwrap();
    scenario.write("README.md", "second\n");
    scenario.write("notes.txt", "tracked notes\n");
    scenario.add(&["README.md", "notes.txt"]);
    let second = scenario.commit("Second");
    let (root_tree, second_tree) = (scenario.tree_of(&root), scenario.tree_of(&second));

    // go back to the root tree by hand, leaving local edits behind
    let changes = diff_trees(repository.database(), Some(&second_tree), Some(&root_tree)).unwrap();
    scenario.write("README.md", "edited, not staged\n");

    let mut index = repository.index();
    index.load().unwrap();
    let mut migration = Migration::new(repository, &mut index, changes);
    let error = migration.apply_changes().unwrap_err();

    assert_eq!(error.exit_code(), 15);
    assert_eq!(migration.state(), MigrationState::DirtyBlocked);
    assert_eq!(
        migration.conflicts().iter().collect::<Vec<_>>(),
        vec![(&PathBuf::from("README.md"), &ConflictType::StaleFile)]
    );
    assert_eq!(scenario.read("notes.txt"), "tracked notes\n");
}

#[rstest]
fn untracked_file_is_kept_when_its_path_is_removed(scenario: Scenario) {
    let repository = &scenario.repository;
    scenario.write("notes.txt", "tracked notes\n");
    scenario.add(&["notes.txt"]);
    scenario.commit("Add notes");
    repository.unstage(&[PathBuf::from("notes.txt")]).unwrap();

    repository.checkout("HEAD^").unwrap();

    assert_eq!(scenario.read("notes.txt"), "tracked notes\n");
    assert!(matches!(repository.refs().head().unwrap(), Head::Detached(_)));
    assert_eq!(
        repository.status().unwrap().untracked.into_iter().collect::<Vec<_>>(),
        vec![PathBuf::from("notes.txt")]
    );
}

#[rstest]
fn same_size_edit_is_found_once_mtime_moves(scenario: Scenario) {
    let path = scenario.dir.path().join("README.md");
    let original = FileTime::from_last_modification_time(&std::fs::metadata(&path).unwrap());

    std::fs::write(&path, "README\n").unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(original.unix_seconds() + 10, 0)).unwrap();

    let report = scenario.repository.status().unwrap();

    assert_eq!(report.unstaged.len(), 1);
    assert_eq!(report.unstaged[0].kind, ChangeKind::Modified);
}

#[rstest]
fn touched_but_unchanged_file_is_not_reported(scenario: Scenario) {
    let path = scenario.dir.path().join("README.md");
    let original = FileTime::from_last_modification_time(&std::fs::metadata(&path).unwrap());

    filetime::set_file_mtime(&path, FileTime::from_unix_time(original.unix_seconds() + 10, 0)).unwrap();

    assert!(scenario.repository.status().unwrap().is_clean());
}

#[rstest]
fn diff_of_a_tree_with_itself_is_empty(scenario: Scenario) {
    let head = scenario.repository.refs().head_commit().unwrap().unwrap();
    let tree = scenario.tree_of(&head);

    let changes = diff_trees(scenario.repository.database(), Some(&tree), Some(&tree)).unwrap();

    assert!(changes.is_empty());
}

#[rstest]
fn ancestors_walk_first_parents_down_to_the_root(scenario: Scenario) {
    scenario.write("README.md", "readme, again\n");
    scenario.add(&["README.md"]);
    let tip = scenario.commit("Second commit");

    let messages = scenario
        .repository
        .ancestors(tip)
        .iter()
        .map(|item| item.unwrap().1.message().to_string())
        .collect::<Vec<_>>();

    assert_eq!(messages, vec!["Second commit", "Initial commit"]);
}

#[rstest]
fn repository_metadata_cannot_be_staged(scenario: Scenario) {
    let error = scenario
        .repository
        .add(&[PathBuf::from(".jit/HEAD")])
        .unwrap_err();

    assert!(matches!(error, JitError::PathNotFound(path) if path == PathBuf::from(".jit/HEAD")));
    let mut index = scenario.repository.index();
    index.load().unwrap();
    assert!(!index.is_tracked(std::path::Path::new(".jit/HEAD")));
}
