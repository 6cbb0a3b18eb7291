use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree_builder::TreeBuilder;
use crate::errors::{JitError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub oid: ObjectId,
    pub branch: BranchName,
    /// The commit has no parent
    pub root: bool,
    pub summary: String,
}

impl Repository {
    /// Record the index as a new commit on the current branch
    pub fn commit(&self, message: &str, author: Author) -> Result<CommitOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(JitError::EmptyCommitMessage);
        }

        let _lock = self.lock()?;
        if let Head::Detached(_) = self.refs().head()? {
            return Err(JitError::DetachedHeadCommit);
        }

        let mut index = self.index();
        index.load()?;

        let tree_oid = TreeBuilder::build(index.entries())?
            .write(&mut |tree| self.database().store(tree))?;
        let parents = self.refs().head_commit()?.into_iter().collect::<Vec<_>>();
        let root = parents.is_empty();

        let commit = Commit::new(parents, tree_oid, author, message.to_string());
        let oid = self.database().store(&commit)?;
        let branch = self.refs().update_head(&oid)?;
        tracing::info!(%oid, %branch, root, "committed");

        Ok(CommitOutcome {
            oid,
            branch,
            root,
            summary: commit.short_message().to_string(),
        })
    }
}
