use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with one commit holding `1.txt`, `a/2.txt` and `a/b/3.txt`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_jit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three\n".to_string(),
    ));

    run_jit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    jit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

#[fixture]
pub fn file_a() -> String {
    r#"fn main() {
    let s = String::new();
    std::io::stdin().read_line(&mut s).unwrap();
    for i in 0..1000000000 {
        println!("{}",  s);
    }

    println!("Done");

    let tx = std::thread::spawn(move || {
        for i in 0..10 {
            println!("Thread: {}", i);
        }
    });

    tx.join().unwrap();

    println!("All threads completed");
}
"#
    .to_string()
}

#[fixture]
pub fn file_b() -> String {
    r#"fn main() {
    let s = String::new();
    std::io::stdin().read_line(&mut s).unwrap();

    println!("Done");

    let tx = std::thread::spawn(move || {
        for i in 0..10 {
            println!("Thread: {}", i);
        }
    });

    if let Err(e) = tx.join() {
        eprintln!("Thread error: {}", e);
    }

    println!("All threads completed");
}
"#
    .to_string()
}

#[fixture]
pub fn diff_hunks_output() -> String {
    "@@ -1,9 +1,6 @@\n fn main() {\n     let s = String::new();\n     std::io::stdin().read_line(&mut s).unwrap();\n-    for i in 0..1000000000 {\n-        println!(\"{}\",  s);\n-    }\n \n     println!(\"Done\");\n \n@@ -13,7 +10,9 @@\n         }\n     });\n \n-    tx.join().unwrap();\n+    if let Err(e) = tx.join() {\n+        eprintln!(\"Thread error: {}\", e);\n+    }\n \n     println!(\"All threads completed\");\n }\n"
        .to_string()
}

pub fn run_jit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("jit").expect("Failed to find jit binary");
    cmd.envs(vec![("NO_PAGER", "1")]);
    cmd.env_remove("JIT_LOG");
    cmd.current_dir(dir);
    cmd.args(args);
    cmd
}

struct RandomAuthor {
    name: String,
    email: String,
}

fn generate_random_author() -> RandomAuthor {
    use fake::Fake;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;

    RandomAuthor {
        name: Name().fake(),
        email: SafeEmail().fake(),
    }
}

pub fn jit_commit(dir: &Path, message: &str) -> Command {
    let author = generate_random_author();
    let mut cmd = run_jit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("JIT_AUTHOR_NAME", author.name.as_str()),
        ("JIT_AUTHOR_EMAIL", author.email.as_str()),
        ("JIT_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd
}

/// Id HEAD resolves to, read straight from the repository files
pub fn head_commit_id(dir: &Path) -> String {
    let jit_dir = dir.join(".jit");
    let head = std::fs::read_to_string(jit_dir.join("HEAD")).expect("Failed to read HEAD");
    let head = head.trim();

    match head.strip_prefix("ref: ") {
        Some(ref_path) => std::fs::read_to_string(jit_dir.join(ref_path))
            .expect("Failed to read ref")
            .trim()
            .to_string(),
        None => head.to_string(),
    }
}

/// Raw content of `.jit/HEAD`
pub fn head_file(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".jit").join("HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .to_string()
}
