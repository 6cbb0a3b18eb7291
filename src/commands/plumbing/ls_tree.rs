use crate::areas::repository::Repository;
use crate::artifacts::diff::tree_diff::{Snapshot, flatten_tree};
use crate::artifacts::objects::object_type::ObjectType;
use crate::commands::plumbing::resolve_object;
use crate::errors::{JitError, Result};

impl Repository {
    /// Every file of a tree, or of a commit's tree, with its full path
    pub fn ls_tree(&self, object: &str) -> Result<Snapshot> {
        let oid = resolve_object(self, object)?;

        let tree_oid = match self.database().get_object_type(&oid)? {
            ObjectType::Commit => self.database().parse_object_as_commit(&oid)?.tree_oid().clone(),
            ObjectType::Tree => oid,
            actual => {
                return Err(JitError::ObjectTypeMismatch {
                    oid,
                    expected: ObjectType::Tree,
                    actual,
                });
            }
        };

        flatten_tree(self.database(), Some(&tree_oid))
    }
}
