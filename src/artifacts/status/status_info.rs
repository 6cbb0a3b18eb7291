use crate::areas::refs::Head;
use crate::artifacts::diff::tree_diff::PathChange;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Where the working tree stands relative to the index and HEAD
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub head: Head,
    /// Index compared to the HEAD tree
    pub staged: Vec<PathChange>,
    /// Working directory compared to the index, tracked paths only
    pub unstaged: Vec<PathChange>,
    pub untracked: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}
