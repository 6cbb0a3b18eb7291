use crate::common::command::{head_file, repository_dir, run_jit_command};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

mod common;

#[rstest]
fn init_creates_the_repository_layout(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let jit_dir = repository_dir.path().canonicalize()?.join(".jit");

    run_jit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized empty Jit repository in"))
        .stdout(predicate::str::contains(jit_dir.display().to_string()));

    repository_dir.child(".jit/objects").assert(predicate::path::is_dir());
    repository_dir.child(".jit/refs/heads").assert(predicate::path::is_dir());
    repository_dir.child(".jit/refs/tags").assert(predicate::path::is_dir());
    assert_eq!(head_file(repository_dir.path()), "ref: refs/heads/master");

    Ok(())
}

#[rstest]
fn init_at_an_explicit_path(repository_dir: TempDir) {
    run_jit_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success();

    repository_dir
        .child("nested/project/.jit/HEAD")
        .assert(predicate::path::is_file());
}

#[rstest]
fn init_twice_reports_the_existing_repository(repository_dir: TempDir) {
    run_jit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_jit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Reinitialized existing Jit repository in"));

    assert_eq!(head_file(repository_dir.path()), "ref: refs/heads/master");
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_jit_command(repository_dir.path(), &["status"])
        .assert()
        .code(19)
        .stderr(predicate::str::contains("not a jit repository"));
}

#[rstest]
fn commands_work_from_a_subdirectory(repository_dir: TempDir) {
    run_jit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("src/lib.rs").write_str("fn lib() {}\n").unwrap();

    run_jit_command(&repository_dir.path().join("src"), &["add", "lib.rs"])
        .assert()
        .success();

    run_jit_command(repository_dir.path(), &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("A  src/lib.rs\n");
}

#[rstest]
fn unknown_subcommand_is_a_usage_error(repository_dir: TempDir) {
    run_jit_command(repository_dir.path(), &["frobnicate"])
        .assert()
        .code(2);
}
