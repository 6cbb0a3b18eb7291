use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::diff::tree_diff::{PathChange, diff_trees};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub target: ObjectId,
    pub previous: Head,
    pub head: Head,
    pub changes: Vec<PathChange>,
}

impl Repository {
    /// Switch the working directory, the index and HEAD to a branch or commit
    pub fn checkout(&self, revision: &str) -> Result<CheckoutOutcome> {
        let _lock = self.lock()?;

        let parsed = Revision::try_parse(revision)?;
        let target = parsed.resolve(self)?;
        let target_tree = self
            .database()
            .parse_object_as_commit(&target)?
            .tree_oid()
            .clone();

        let previous = self.refs().head()?;
        let current_tree = self.head_tree()?;
        let changes = diff_trees(self.database(), current_tree.as_ref(), Some(&target_tree))?;
        tracing::debug!(%target, changes = changes.len(), "planned checkout");

        let changes = {
            let mut index = self.index();
            index.load()?;

            let mut migration = Migration::new(self, &mut index, changes);
            migration.apply_changes()?;
            migration.changes().to_vec()
        };

        let head = match (&parsed, parsed.branch(self)) {
            (Revision::Head, _) => previous.clone(),
            (_, Some(branch)) => Head::Branch(branch),
            (_, None) => Head::Detached(target.clone()),
        };
        self.refs().set_head(&head)?;
        tracing::info!(%target, ?head, "checked out");

        Ok(CheckoutOutcome {
            target,
            previous,
            head,
            changes,
        })
    }
}
