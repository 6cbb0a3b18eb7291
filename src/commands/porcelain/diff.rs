use crate::areas::repository::Repository;
use crate::artifacts::diff::ChangeFilter;
use crate::artifacts::diff::diff_target::DiffTarget;
use crate::artifacts::diff::text_diff::{TextDiff, text_diff};
use crate::artifacts::diff::tree_diff::{PathChange, diff_index_vs_tree, diff_workspace_vs_index};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct FileDiff {
    pub change: PathChange,
    pub old: DiffTarget,
    pub new: DiffTarget,
    pub text: TextDiff,
}

impl Repository {
    /// Unstaged changes (working directory against index), or with `staged`
    /// the changes the next commit would record (index against HEAD)
    pub fn diff(&self, staged: bool, filter: Option<ChangeFilter>) -> Result<Vec<FileDiff>> {
        let mut index = self.index();
        index.load()?;

        let changes = if staged {
            let head_tree = self.head_tree()?;
            diff_index_vs_tree(self.database(), &index, head_tree.as_ref())?
        } else {
            diff_workspace_vs_index(self.workspace(), &index)?
        };

        changes
            .into_iter()
            .filter(|change| filter.is_none_or(|filter| filter.matches(change.kind)))
            .map(|change| -> Result<FileDiff> {
                let old = DiffTarget::from_database(&change.path, change.old.as_ref(), self.database())?;
                let new = if staged {
                    DiffTarget::from_database(&change.path, change.new.as_ref(), self.database())?
                } else {
                    DiffTarget::from_workspace(&change.path, change.new.as_ref(), self.workspace())?
                };
                let text = text_diff(&old.data, &new.data);

                Ok(FileDiff {
                    change,
                    old,
                    new,
                    text,
                })
            })
            .collect()
    }
}
