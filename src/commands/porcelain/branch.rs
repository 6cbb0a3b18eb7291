use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{BranchName, RefName, RefNamespace};
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{JitError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchListing {
    pub name: BranchName,
    pub oid: ObjectId,
    pub current: bool,
}

impl Repository {
    /// Create a branch at `start` (HEAD when `None`)
    pub fn create_branch(&self, name: &str, start: Option<&str>) -> Result<ObjectId> {
        let name = BranchName::try_parse(name.to_string())?;
        let _lock = self.lock()?;

        let oid = self.resolve_start_point(start)?;
        self.refs().create_branch(&name, &oid)?;
        tracing::info!(%name, %oid, "created branch");

        Ok(oid)
    }

    /// Delete a branch, returning the commit it pointed at
    pub fn delete_branch(&self, name: &str) -> Result<ObjectId> {
        let name = BranchName::try_parse(name.to_string())?;
        let _lock = self.lock()?;

        let oid = self.refs().delete(&RefName::Branch(name.clone()))?;
        tracing::info!(%name, %oid, "deleted branch");

        Ok(oid)
    }

    pub fn list_branches(&self) -> Result<Vec<BranchListing>> {
        let current = self.refs().current_branch()?;

        Ok(self
            .refs()
            .list(RefNamespace::Heads)?
            .into_iter()
            .map(|(name, oid)| BranchListing {
                current: current.as_ref() == Some(&name),
                name,
                oid,
            })
            .collect())
    }

    pub(crate) fn resolve_start_point(&self, start: Option<&str>) -> Result<ObjectId> {
        match start {
            Some(revision) => Revision::try_parse(revision)?.resolve(self),
            None => self
                .refs()
                .head_commit()?
                .ok_or_else(|| JitError::UnknownRevision("HEAD".to_string())),
        }
    }
}
