//! Working directory access
//!
//! All paths handed to and returned from the workspace are relative to the
//! repository root. The `.jit` directory is never listed.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::{JitError, Result};
use anyhow::Context;
use bytes::Bytes;
use std::ffi::OsStr;
use std::fs::Metadata;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const REPOSITORY_DIR_NAME: &str = ".jit";

const IGNORED_PATHS: [&str; 1] = [REPOSITORY_DIR_NAME];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn a user supplied path (absolute, or relative to `base`) into a
    /// repository-relative one, without touching the filesystem
    pub fn relative_path(&self, base: &Path, path: &Path) -> Result<PathBuf> {
        let absolute = normalize(&base.join(path));

        absolute
            .strip_prefix(&self.path)
            .map(Path::to_path_buf)
            .map_err(|_| {
                anyhow::anyhow!("{} is outside repository at {}", path.display(), self.path.display())
                    .into()
            })
    }

    /// Every file under `root` (the whole workspace when `None`), sorted
    pub fn list_files(&self, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        if root.is_some_and(Self::is_repository_path) {
            return Ok(Vec::new());
        }

        let root_path = match root {
            Some(root) => self.path.join(root),
            None => self.path.to_path_buf(),
        };

        if root_path.is_file() {
            return Ok(vec![root.map(Path::to_path_buf).unwrap_or_default()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()))
        {
            let entry = entry.map_err(anyhow::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.path)
                .map_err(anyhow::Error::from)?;
            files.push(relative.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// True for `.jit` itself and anything below it
    pub fn is_repository_path(path: &Path) -> bool {
        path.components().find(|component| component != &Component::CurDir)
            == Some(Component::Normal(OsStr::new(REPOSITORY_DIR_NAME)))
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let content = std::fs::read(self.path.join(file_path))
            .with_context(|| format!("Unable to read {}", file_path.display()))?;

        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, file_path: &Path) -> Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Stat data for a workspace file, `None` when nothing regular is there
    pub fn stat_file(&self, file_path: &Path) -> Result<Option<EntryMetadata>> {
        match self.metadata(file_path)? {
            Some(metadata) if metadata.is_file() => {
                let stat: EntryMetadata =
                    (self.path.join(file_path).as_path(), metadata).try_into()?;
                Ok(Some(stat))
            }
            _ => Ok(None),
        }
    }

    pub fn metadata(&self, file_path: &Path) -> Result<Option<Metadata>> {
        match std::fs::symlink_metadata(self.path.join(file_path)) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) if error.kind() == std::io::ErrorKind::NotADirectory => Ok(None),
            Err(error) => Err(JitError::Io(error)),
        }
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.path.join(path).is_dir()
    }

    /// Write file content, creating parent directories and applying the mode
    pub fn write_file(&self, file_path: &Path, data: &[u8], mode: EntryMode) -> Result<()> {
        let path = self.path.join(file_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory for {}", file_path.display())
            })?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {}", file_path.display()))?;
        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {}", file_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode.permissions());
            std::fs::set_permissions(&path, permissions).with_context(|| {
                format!("Failed to set permissions for file: {}", file_path.display())
            })?;
        }

        Ok(())
    }

    /// Delete a file, then every parent directory it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> Result<()> {
        let path = self.path.join(file_path);

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(anyhow::Error::new(error)
                    .context(format!("Failed to remove file: {}", file_path.display()))
                    .into());
            }
        }

        self.prune_empty_parent_dirs(file_path)
    }

    fn prune_empty_parent_dirs(&self, file_path: &Path) -> Result<()> {
        for parent in file_path.ancestors().skip(1) {
            if parent.as_os_str().is_empty() {
                break;
            }

            let dir_path = self.path.join(parent);
            let is_empty = match std::fs::read_dir(&dir_path) {
                Ok(mut entries) => entries.next().is_none(),
                Err(_) => break,
            };
            if !is_empty {
                break;
            }

            std::fs::remove_dir(&dir_path).with_context(|| {
                format!("Failed to remove empty directory: {}", parent.display())
            })?;
        }

        Ok(())
    }
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn write(dir: &TempDir, path: &str, content: &str) {
        let path = dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().canonicalize().unwrap().into_boxed_path())
    }

    #[rstest]
    fn list_files_skips_repository_dir(dir: TempDir) {
        write(&dir, "b.txt", "b");
        write(&dir, "a/c.txt", "c");
        write(&dir, ".jit/HEAD", "ref: refs/heads/master");

        let files = workspace(&dir).list_files(None).unwrap();

        assert_eq!(files, vec![PathBuf::from("a/c.txt"), PathBuf::from("b.txt")]);
    }

    #[rstest]
    #[case(".jit/HEAD")]
    #[case(".jit")]
    #[case("./.jit/refs")]
    fn repository_files_are_never_listed(dir: TempDir, #[case] root: &str) {
        write(&dir, ".jit/HEAD", "ref: refs/heads/master");
        write(&dir, ".jit/refs/heads/master", "0000");

        let files = workspace(&dir).list_files(Some(Path::new(root))).unwrap();

        assert!(files.is_empty());
        assert!(Workspace::is_repository_path(Path::new(root)));
    }

    #[rstest]
    #[case("src/.jit")]
    #[case(".jitignore")]
    fn only_the_top_level_repository_dir_is_special(#[case] path: &str) {
        assert!(!Workspace::is_repository_path(Path::new(path)));
    }

    #[rstest]
    fn remove_file_prunes_empty_parents(dir: TempDir) {
        write(&dir, "a/b/c.txt", "c");
        write(&dir, "a/keep.txt", "k");
        let workspace = workspace(&dir);

        workspace.remove_file(Path::new("a/b/c.txt")).unwrap();

        assert!(!dir.path().join("a/b").exists());
        assert!(dir.path().join("a/keep.txt").exists());
    }

    #[rstest]
    fn write_file_applies_executable_mode(dir: TempDir) {
        let workspace = workspace(&dir);

        workspace
            .write_file(
                Path::new("bin/run.sh"),
                b"#!/bin/sh\n",
                EntryMode::File(FileMode::Executable),
            )
            .unwrap();

        let stat = workspace.stat_file(Path::new("bin/run.sh")).unwrap().unwrap();
        assert_eq!(stat.mode, EntryMode::File(FileMode::Executable));
        assert_eq!(stat.size, 10);
    }

    #[rstest]
    #[case("a/./b.txt", "a/b.txt")]
    #[case("a/../b.txt", "b.txt")]
    #[case("sub/../sub/c", "sub/c")]
    fn relative_path_is_normalized(dir: TempDir, #[case] input: &str, #[case] expected: &str) {
        let workspace = workspace(&dir);

        let relative = workspace
            .relative_path(workspace.path(), Path::new(input))
            .unwrap();
        assert_eq!(relative, PathBuf::from(expected));
    }

    #[rstest]
    fn paths_outside_the_workspace_are_rejected(dir: TempDir) {
        let workspace = workspace(&dir);

        assert!(workspace.relative_path(workspace.path(), Path::new("../elsewhere")).is_err());
    }
}
