/// Why a checkout refused to touch a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConflictType {
    /// Tracked file with staged or unstaged edits the checkout would lose
    StaleFile,
    /// Directory in the way of a file, still holding files of its own
    StaleDirectory,
    /// Untracked file the checkout would overwrite with other content
    UntrackedOverwritten,
}

impl ConflictType {
    pub fn message(&self) -> &'static str {
        match self {
            ConflictType::StaleFile => {
                "local changes would be overwritten by checkout"
            }
            ConflictType::StaleDirectory => {
                "updating this directory would lose untracked files in it"
            }
            ConflictType::UntrackedOverwritten => {
                "untracked working tree file would be overwritten by checkout"
            }
        }
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}
