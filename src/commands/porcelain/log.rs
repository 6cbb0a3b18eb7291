use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct LogOutcome {
    pub head: Head,
    /// Refs pointing at each listed commit, for decorations
    pub decorations: HashMap<ObjectId, Vec<RefName>>,
    /// Newest first
    pub commits: Vec<(ObjectId, Commit)>,
}

impl Repository {
    /// Lazy first-parent walk from `start`, newest first, ending at the root
    pub fn ancestors(&self, start: ObjectId) -> RevList<'_> {
        RevList::new(self.database(), Some(start))
    }

    /// First-parent history from `start` (HEAD when `None`)
    pub fn log(&self, start: Option<&str>) -> Result<LogOutcome> {
        let start_oid = match start {
            Some(revision) => Some(Revision::try_parse(revision)?.resolve(self)?),
            None => self.refs().head_commit()?,
        };

        let commits = match start_oid {
            Some(oid) => self.ancestors(oid).iter().collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(LogOutcome {
            head: self.refs().head()?,
            decorations: self.refs().reverse_refs()?,
            commits,
        })
    }
}
