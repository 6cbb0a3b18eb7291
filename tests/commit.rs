use crate::common::command::{
    head_commit_id, head_file, init_repository_dir, jit_commit, repository_dir, run_jit_command,
};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn first_commit_is_reported_as_root(repository_dir: TempDir) {
    run_jit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n").unwrap();
    run_jit_command(repository_dir.path(), &["add", "hello.txt"])
        .assert()
        .success();

    let output = jit_commit(repository_dir.path(), "Initial commit")
        .output()
        .expect("Failed to run commit");
    assert!(output.status.success());

    let head = head_commit_id(repository_dir.path());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("[master (root-commit) {}] Initial commit\n", &head[..7])
    );
}

#[rstest]
fn second_commit_has_the_first_as_parent(init_repository_dir: TempDir) {
    let first = head_commit_id(init_repository_dir.path());
    init_repository_dir.child("1.txt").write_str("uno\n").unwrap();
    run_jit_command(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    jit_commit(init_repository_dir.path(), "Second commit")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[master "))
        .stdout(predicate::str::contains("root-commit").not());

    let second = head_commit_id(init_repository_dir.path());
    run_jit_command(init_repository_dir.path(), &["cat-file", "-p", &second])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("parent {first}\n")));
}

#[rstest]
fn empty_message_is_rejected(init_repository_dir: TempDir) {
    let before = head_commit_id(init_repository_dir.path());

    jit_commit(init_repository_dir.path(), "   ")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("empty commit message"));

    assert_eq!(head_commit_id(init_repository_dir.path()), before);
}

#[rstest]
fn missing_author_is_an_error(init_repository_dir: TempDir) {
    run_jit_command(init_repository_dir.path(), &["commit", "-m", "anonymous"])
        .env_remove("JIT_AUTHOR_NAME")
        .env_remove("JIT_AUTHOR_EMAIL")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("JIT_AUTHOR_NAME"));
}

#[rstest]
fn commit_on_detached_head_is_refused(init_repository_dir: TempDir) {
    let head = head_commit_id(init_repository_dir.path());
    run_jit_command(init_repository_dir.path(), &["checkout", &head])
        .assert()
        .success();

    jit_commit(init_repository_dir.path(), "Orphan")
        .assert()
        .code(17);

    assert_eq!(head_file(init_repository_dir.path()), head);
}

#[rstest]
fn commit_records_nested_trees(init_repository_dir: TempDir) {
    run_jit_command(init_repository_dir.path(), &["ls-tree", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^100644 blob [0-9a-f]{40}\t1\.txt\n100644 blob [0-9a-f]{40}\ta/2\.txt\n100644 blob [0-9a-f]{40}\ta/b/3\.txt\n$",
        ).unwrap());
}
