use crate::areas::refs::Head;
use crate::areas::repository::{DEFAULT_BRANCH, Repository};
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub struct InitOutcome {
    pub repository: Repository,
    /// The `.jit` directory was already there
    pub reinitialized: bool,
}

impl Repository {
    /// Create (or re-create the missing parts of) a repository rooted at `path`
    pub fn init(path: &Path) -> Result<InitOutcome> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;

        let repository = Repository::at(&path);
        let reinitialized = repository.refs().head_path().is_file();

        fs::create_dir_all(repository.database().objects_path())
            .context("Failed to create .jit/objects directory")?;
        fs::create_dir_all(repository.refs().heads_path())
            .context("Failed to create .jit/refs/heads directory")?;
        fs::create_dir_all(repository.refs().tags_path())
            .context("Failed to create .jit/refs/tags directory")?;

        if !reinitialized {
            let branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
            repository.refs().set_head(&Head::Branch(branch))?;
        }

        tracing::info!(path = %repository.git_path().display(), reinitialized, "initialized repository");

        Ok(InitOutcome {
            repository,
            reinitialized,
        })
    }
}
