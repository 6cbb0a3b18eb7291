use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::errors::Result;
use derive_new::new;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(new)]
pub struct Inspector<'r> {
    workspace: &'r Workspace,
    index: &'r Index,
}

impl Inspector<'_> {
    /// Workspace files missing from the index.
    ///
    /// A directory holding nothing tracked is reported once, as `dir/`,
    /// instead of file by file.
    pub fn untracked_files(&self) -> Result<BTreeSet<PathBuf>> {
        let mut untracked = BTreeSet::new();

        for file in self.workspace.list_files(None)? {
            if self.index.entry_by_path(&file).is_some() {
                continue;
            }

            match self.outermost_untracked_dir(&file) {
                Some(dir) => {
                    let mut dir = dir.to_path_buf();
                    dir.push("");
                    untracked.insert(dir);
                }
                None => {
                    untracked.insert(file);
                }
            }
        }

        Ok(untracked)
    }

    fn outermost_untracked_dir<'p>(&self, file: &'p Path) -> Option<&'p Path> {
        let mut dirs = file
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();

        dirs.into_iter().find(|dir| !self.index.is_tracked(dir))
    }
}
