use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{BranchName, RefName, RefNamespace};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;

impl Repository {
    /// Create a lightweight tag at `target` (HEAD when `None`)
    pub fn create_tag(&self, name: &str, target: Option<&str>) -> Result<ObjectId> {
        let name = BranchName::try_parse(name.to_string())?;
        let _lock = self.lock()?;

        let oid = self.resolve_start_point(target)?;
        self.refs().create_tag(&name, &oid)?;
        tracing::info!(%name, %oid, "created tag");

        Ok(oid)
    }

    pub fn delete_tag(&self, name: &str) -> Result<ObjectId> {
        let name = BranchName::try_parse(name.to_string())?;
        let _lock = self.lock()?;

        let oid = self.refs().delete(&RefName::Tag(name.clone()))?;
        tracing::info!(%name, %oid, "deleted tag");

        Ok(oid)
    }

    pub fn list_tags(&self) -> Result<Vec<(BranchName, ObjectId)>> {
        self.refs().list(RefNamespace::Tags)
    }
}
