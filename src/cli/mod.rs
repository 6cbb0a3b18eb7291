//! Command-line front end
//!
//! Parses arguments into [`Commands`], calls the matching core operation on a
//! [`Repository`] and hands the typed outcome to [`render`].

pub mod pager;
pub mod render;

use clap::{Parser, Subcommand};
use jit::areas::repository::Repository;
use jit::artifacts::diff::ChangeFilter;
use jit::artifacts::objects::commit::Author;
use jit::artifacts::objects::object::ObjectBox;
use jit::errors::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "jit",
    version = "0.1.0",
    about = "A small local version-control system",
    long_about = "Stores snapshots of a directory tree as content-addressed objects, \
    with a staging index, branches, tags, diffs and checkout.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Create an empty repository",
        long_about = "Creates the .jit directory in the current directory or at the given path. \
        Running it again on an existing repository is harmless."
    )]
    Init {
        #[arg(index = 1, help = "Where to create the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage file contents for the next commit")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "unstage", about = "Remove paths from the index")]
    Unstage {
        #[arg(index = 1, required = true, help = "Files or directories to unstage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Record the index as a new commit",
        long_about = "Creates a commit from the staged content on the current branch. \
        The author is read from JIT_AUTHOR_NAME, JIT_AUTHOR_EMAIL and optionally JIT_AUTHOR_DATE."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show staged, unstaged and untracked changes")]
    Status {
        #[arg(long, help = "Two-letter status codes, one path per line")]
        porcelain: bool,
    },
    #[command(name = "log", about = "Show the commit history")]
    Log {
        #[arg(long, help = "One line per commit")]
        oneline: bool,
        #[arg(index = 1, help = "Revision to start from, HEAD by default")]
        revision: Option<String>,
    },
    #[command(
        name = "branch",
        about = "List, create or delete branches",
        long_about = "Without arguments lists branches. With a name creates a branch at the \
        start revision (HEAD by default)."
    )]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(index = 2, requires = "name", help = "Revision the branch starts at")]
        start: Option<String>,
        #[arg(short, long, value_name = "NAME", conflicts_with = "name", help = "Delete a branch")]
        delete: Option<String>,
    },
    #[command(name = "checkout", about = "Switch to a branch or commit")]
    Checkout {
        #[arg(index = 1, help = "Branch name or revision")]
        revision: String,
    },
    #[command(
        name = "diff",
        about = "Show changes as hunks",
        long_about = "Compares the working directory against the index, or with --staged \
        the index against HEAD."
    )]
    Diff {
        #[arg(long, visible_alias = "cached", help = "Compare the index against HEAD")]
        staged: bool,
        #[arg(
            long = "diff-filter",
            value_name = "AMD",
            value_parser = parse_diff_filter,
            help = "Only show Added, Modified or Deleted paths"
        )]
        filter: Option<ChangeFilter>,
    },
    #[command(
        name = "tag",
        about = "List, create or delete tags",
        long_about = "Without arguments (or with -l) lists tags. With a name creates a tag at \
        the given revision (HEAD by default)."
    )]
    Tag {
        #[arg(index = 1, help = "Name of the tag to create")]
        name: Option<String>,
        #[arg(index = 2, requires = "name", help = "Revision the tag points at")]
        revision: Option<String>,
        #[arg(short, long, conflicts_with_all = ["name", "delete"], help = "List tags")]
        list: bool,
        #[arg(short, long, value_name = "NAME", conflicts_with = "name", help = "Delete a tag")]
        delete: Option<String>,
    },
    #[command(
        name = "hash-object",
        about = "Compute the blob id of a file and optionally store it",
        long_about = "Hashes a file as a blob. With -w the blob is also written to the object store."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "Prints an object from the store. Accepts a full id, a unique prefix \
        or any revision."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object to print")]
        object: String,
    },
    #[command(name = "ls-tree", about = "List every file of a tree or commit")]
    LsTree {
        #[arg(index = 1)]
        revision: String,
    },
}

fn parse_diff_filter(value: &str) -> std::result::Result<ChangeFilter, String> {
    ChangeFilter::try_parse(value)
        .ok_or_else(|| format!("'{value}' is not a combination of A, M and D"))
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir()?;

        if let Commands::Init { path } = &self.command {
            let path = path.as_ref().map_or_else(|| cwd.clone(), |path| cwd.join(path));
            let outcome = Repository::init(&path)?;
            return render::init(&mut std::io::stdout(), &outcome);
        }

        let repository = Repository::discover(&cwd)?;
        let mut stdout = std::io::stdout().lock();

        match self.command {
            // handled before discovery
            Commands::Init { .. } => Ok(()),
            Commands::Add { paths } => {
                repository.add(&repository_paths(&repository, &cwd, &paths)?)?;
                Ok(())
            }
            Commands::Unstage { paths } => {
                repository.unstage(&repository_paths(&repository, &cwd, &paths)?)?;
                Ok(())
            }
            Commands::Commit { message } => {
                let author = Author::load_from_env()?;
                let outcome = repository.commit(&message, author)?;
                render::commit(&mut stdout, &outcome)
            }
            Commands::Status { porcelain } => {
                let report = repository.status()?;
                if porcelain {
                    render::status_porcelain(&mut stdout, &report)
                } else {
                    render::status(&mut stdout, &report)
                }
            }
            Commands::Log { oneline, revision } => {
                let outcome = repository.log(revision.as_deref())?;
                drop(stdout);
                pager::paged(|writer| render::log(writer, &outcome, oneline))
            }
            Commands::Branch {
                name,
                start,
                delete,
            } => match (name, delete) {
                (_, Some(name)) => {
                    let oid = repository.delete_branch(&name)?;
                    Ok(writeln!(
                        stdout,
                        "Deleted branch {name} (was {}).",
                        oid.to_short_oid()
                    )?)
                }
                (Some(name), None) => {
                    repository.create_branch(&name, start.as_deref())?;
                    Ok(())
                }
                (None, None) => render::branches(&mut stdout, &repository.list_branches()?),
            },
            Commands::Checkout { revision } => {
                let outcome = repository.checkout(&revision)?;
                let target = repository.database().parse_object_as_commit(&outcome.target)?;
                render::checkout(&mut stdout, &outcome, &target)
            }
            Commands::Diff { staged, filter } => {
                let diffs = repository.diff(staged, filter)?;
                drop(stdout);
                pager::paged(|writer| render::diff(writer, &diffs))
            }
            Commands::Tag {
                name,
                revision,
                list: _,
                delete,
            } => match (name, delete) {
                (_, Some(name)) => {
                    let oid = repository.delete_tag(&name)?;
                    Ok(writeln!(
                        stdout,
                        "Deleted tag '{name}' (was {})",
                        oid.to_short_oid()
                    )?)
                }
                (Some(name), None) => {
                    repository.create_tag(&name, revision.as_deref())?;
                    Ok(())
                }
                (None, None) => render::tags(&mut stdout, &repository.list_tags()?),
            },
            Commands::HashObject { write, file } => {
                let file = repository.workspace().relative_path(&cwd, &file)?;
                let oid = repository.hash_object(&file, write)?;
                Ok(writeln!(stdout, "{oid}")?)
            }
            Commands::CatFile { object } => match repository.cat_file(&object)? {
                ObjectBox::Blob(blob) => Ok(stdout.write_all(blob.content())?),
                object => Ok(writeln!(stdout, "{}", object.display())?),
            },
            Commands::LsTree { revision } => {
                render::ls_tree(&mut stdout, &repository.ls_tree(&revision)?)
            }
        }
    }
}

/// Command-line paths are relative to the current directory, the core wants
/// them relative to the repository root
fn repository_paths(repository: &Repository, cwd: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths
        .iter()
        .map(|path| repository.workspace().relative_path(cwd, path))
        .collect()
}
