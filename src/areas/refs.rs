//! References (branches, tags, HEAD)
//!
//! References are human-readable names pointing at commits:
//! - HEAD: the current branch (symbolic) or a commit (detached)
//! - Branches: `refs/heads/*`, moved forward by commits
//! - Tags: `refs/tags/*`, lightweight and fixed
//!
//! ## File Format
//!
//! Reference files hold either a 40-character object id or, for HEAD only,
//! `ref: <path>`. Every update writes a sibling `<name>.lock` file, fsyncs it
//! and renames it over the reference, so readers never see a torn write.

use crate::artifacts::branch::branch_name::{BranchName, RefName, RefNamespace, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{JitError, Result};
use anyhow::Context;
use derive_new::new;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// What HEAD currently designates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// HEAD follows a branch, which may not have any commit yet
    Branch(BranchName),
    /// HEAD points straight at a commit
    Detached(ObjectId),
}

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef { sym_ref_name: SymRefName },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> Result<Option<SymRefOrOid>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(anyhow::Error::new(error)
                    .context(format!("failed to read ref file at {}", path.display()))
                    .into());
            }
        };
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)
            .map_err(anyhow::Error::from)?
            .captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }))
        } else {
            let oid = ObjectId::try_parse(content.to_string())
                .with_context(|| format!("ref file {} is malformed", path.display()))?;
            Ok(Some(SymRefOrOid::Oid(oid)))
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (`.jit`)
    path: Box<Path>,
}

impl Refs {
    pub fn head(&self) -> Result<Head> {
        match SymRefOrOid::read_symref_or_oid(&self.head_path())? {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => Ok(Head::Branch(
                BranchName::try_parse_sym_ref_name(&sym_ref_name)?,
            )),
            Some(SymRefOrOid::Oid(oid)) => Ok(Head::Detached(oid)),
            None => Err(JitError::RefNotFound(HEAD_REF_NAME.to_string())),
        }
    }

    pub fn set_head(&self, head: &Head) -> Result<()> {
        let content = match head {
            Head::Branch(name) => format!("ref: {}", name.to_sym_ref_name().as_ref_path()),
            Head::Detached(oid) => oid.to_string(),
        };

        self.write_ref_file(&self.head_path(), &content)?;
        tracing::debug!(?head, "moved HEAD");

        Ok(())
    }

    /// Commit HEAD resolves to; `None` while the current branch is unborn
    pub fn head_commit(&self) -> Result<Option<ObjectId>> {
        match self.head()? {
            Head::Branch(name) => self.read(&RefName::Branch(name)),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        match self.head()? {
            Head::Branch(name) => Ok(Some(name)),
            Head::Detached(_) => Ok(None),
        }
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> Result<bool> {
        Ok(self.current_branch()?.as_ref() == Some(branch_name))
    }

    pub fn read(&self, ref_name: &RefName) -> Result<Option<ObjectId>> {
        match SymRefOrOid::read_symref_or_oid(&self.path.join(ref_name.as_ref_path()))? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef { .. }) => Err(anyhow::anyhow!(
                "{ref_name} is a symbolic reference, which only HEAD may be"
            )
            .into()),
            None => Ok(None),
        }
    }

    pub fn resolve(&self, ref_name: &RefName) -> Result<ObjectId> {
        self.read(ref_name)?
            .ok_or_else(|| JitError::RefNotFound(ref_name.to_string()))
    }

    pub fn exists(&self, ref_name: &RefName) -> bool {
        self.path.join(ref_name.as_ref_path()).is_file()
    }

    pub fn update(&self, ref_name: &RefName, oid: &ObjectId) -> Result<()> {
        self.write_ref_file(&self.path.join(ref_name.as_ref_path()), oid.as_ref())?;
        tracing::debug!(%ref_name, %oid, "updated ref");

        Ok(())
    }

    /// Point the current branch at a new commit
    pub fn update_head(&self, oid: &ObjectId) -> Result<BranchName> {
        match self.head()? {
            Head::Branch(name) => {
                self.update(&RefName::Branch(name.clone()), oid)?;
                Ok(name)
            }
            Head::Detached(_) => Err(JitError::DetachedHeadCommit),
        }
    }

    pub fn create_branch(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        let ref_name = RefName::Branch(name.clone());
        if self.exists(&ref_name) {
            return Err(JitError::BranchAlreadyExists(name.to_string()));
        }

        self.update(&ref_name, oid)
    }

    pub fn create_tag(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        let ref_name = RefName::Tag(name.clone());
        if self.exists(&ref_name) {
            return Err(JitError::TagAlreadyExists(name.to_string()));
        }

        self.update(&ref_name, oid)
    }

    /// Remove a ref, returning the id it pointed at
    pub fn delete(&self, ref_name: &RefName) -> Result<ObjectId> {
        if let RefName::Branch(name) = ref_name
            && self.is_current_branch(name)?
        {
            return Err(JitError::CannotDeleteCurrentBranch(name.to_string()));
        }

        let oid = self.resolve(ref_name)?;
        let ref_path = self.path.join(ref_name.as_ref_path());

        std::fs::remove_file(&ref_path)
            .with_context(|| format!("failed to delete ref file at {}", ref_path.display()))?;
        self.prune_empty_parent_dirs(&ref_path, ref_name.namespace())?;
        tracing::debug!(%ref_name, %oid, "deleted ref");

        Ok(oid)
    }

    /// All refs of a namespace, sorted by name
    pub fn list(&self, namespace: RefNamespace) -> Result<Vec<(BranchName, ObjectId)>> {
        let namespace_path = self.path.join(namespace.prefix());
        let mut refs = Vec::new();

        if !namespace_path.is_dir() {
            return Ok(refs);
        }

        for entry in WalkDir::new(&namespace_path).sort_by_file_name() {
            let entry = entry.map_err(anyhow::Error::from)?;

            if !entry.file_type().is_file()
                || entry.path().extension() == Some(std::ffi::OsStr::new("lock"))
            {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(&namespace_path)
                .map_err(anyhow::Error::from)?;
            let name = BranchName::try_parse(relative_path.to_string_lossy().to_string())?;
            let ref_name = match namespace {
                RefNamespace::Heads => RefName::Branch(name.clone()),
                RefNamespace::Tags => RefName::Tag(name.clone()),
            };

            refs.push((name, self.resolve(&ref_name)?));
        }

        refs.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(refs)
    }

    /// Every branch and tag grouped by the commit it points at
    pub fn reverse_refs(&self) -> Result<HashMap<ObjectId, Vec<RefName>>> {
        let mut reverse_refs: HashMap<ObjectId, Vec<RefName>> = HashMap::new();

        for (name, oid) in self.list(RefNamespace::Heads)? {
            reverse_refs.entry(oid).or_default().push(RefName::Branch(name));
        }
        for (name, oid) in self.list(RefNamespace::Tags)? {
            reverse_refs.entry(oid).or_default().push(RefName::Tag(name));
        }

        Ok(reverse_refs)
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("invalid ref path {}", path.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create ref directory {}", parent.display()))?;

        let mut lock_path = path.as_os_str().to_owned();
        lock_path.push(".lock");
        let lock_path = Path::new(&lock_path);

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(lock_path)
            .with_context(|| format!("failed to open ref file at {}", lock_path.display()))?;
        ref_file
            .write_all(format!("{content}\n").as_bytes())
            .and_then(|_| ref_file.sync_all())
            .with_context(|| format!("failed to write ref file at {}", lock_path.display()))?;

        std::fs::rename(lock_path, path)
            .with_context(|| format!("failed to move ref file into {}", path.display()))?;

        Ok(())
    }

    fn prune_empty_parent_dirs(&self, path: &Path, namespace: RefNamespace) -> Result<()> {
        let namespace_path = self.path.join(namespace.prefix());

        if let Some(parent) = path.parent()
            && parent.starts_with(&namespace_path)
            && parent != namespace_path.as_path()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty ref directory at {}", parent.display())
            })?;
            self.prune_empty_parent_dirs(parent, namespace)?;
        }

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.path.join(RefNamespace::Heads.prefix()).into_boxed_path()
    }

    pub fn tags_path(&self) -> Box<Path> {
        self.path.join(RefNamespace::Tags.prefix()).into_boxed_path()
    }
}
