use crate::areas::repository::Repository;
use crate::artifacts::diff::tree_diff::{diff_index_vs_tree, diff_workspace_vs_index};
use crate::artifacts::status::inspector::Inspector;
use crate::artifacts::status::status_info::StatusReport;
use crate::errors::Result;

impl Repository {
    pub fn status(&self) -> Result<StatusReport> {
        let mut index = self.index();
        index.load()?;

        let head_tree = self.head_tree()?;
        let staged = diff_index_vs_tree(self.database(), &index, head_tree.as_ref())?;
        let unstaged = diff_workspace_vs_index(self.workspace(), &index)?;
        let untracked = Inspector::new(self.workspace(), &index).untracked_files()?;

        Ok(StatusReport {
            head: self.refs().head()?,
            staged,
            unstaged,
            untracked,
        })
    }
}
