use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::collections::HashSet;

/// Restartable description of a first-parent walk
#[derive(Debug, Clone)]
pub struct RevList<'r> {
    database: &'r Database,
    start: Option<ObjectId>,
}

impl<'r> RevList<'r> {
    /// Walk from `start`; `None` (an unborn branch) yields nothing
    pub fn new(database: &'r Database, start: Option<ObjectId>) -> Self {
        RevList { database, start }
    }

    /// Start a fresh traversal; each call begins again from the start commit
    pub fn iter(&self) -> RevListIter<'r> {
        RevListIter {
            database: self.database,
            current_commit_oid: self.start.clone(),
            visited: HashSet::new(),
        }
    }
}

impl<'r> IntoIterator for &RevList<'r> {
    type Item = Result<(ObjectId, Commit)>;
    type IntoIter = RevListIter<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over `(id, commit)` pairs
///
/// Each id is yielded at most once, so even a damaged history that loops back
/// on itself ends. A commit that cannot be read is yielded as an error and
/// ends the walk.
#[derive(Debug, Clone)]
pub struct RevListIter<'r> {
    database: &'r Database,
    current_commit_oid: Option<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl Iterator for RevListIter<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;
        if !self.visited.insert(commit_oid.clone()) {
            tracing::warn!(%commit_oid, "commit history loops back on itself");
            return None;
        }

        match self.database.parse_object_as_commit(&commit_oid) {
            Ok(commit) => {
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Author;
    use crate::artifacts::objects::object::Object;
    use crate::artifacts::objects::object_type::ObjectType;
    use assert_fs::TempDir;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct History {
        _dir: TempDir,
        database: Database,
        commits: Vec<ObjectId>,
    }

    fn author() -> Author {
        let timestamp =
            chrono::DateTime::parse_from_rfc2822("Sun, 01 Jan 2023 12:00:00 +0000").unwrap();
        Author::new_with_timestamp("fake_user".into(), "fake_email@email.com".into(), timestamp)
    }

    #[fixture]
    fn history() -> History {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let tree = database.put(ObjectType::Tree, Bytes::new()).unwrap();

        let mut commits: Vec<ObjectId> = Vec::new();
        for message in ["first", "second", "third"] {
            let parents = commits.last().cloned().into_iter().collect();
            let commit = Commit::new(parents, tree.clone(), author(), message.into());
            commits.push(database.store(&commit).unwrap());
        }

        History {
            _dir: dir,
            database,
            commits,
        }
    }

    fn messages(rev_list: &RevList) -> Vec<String> {
        rev_list
            .iter()
            .map(|item| item.unwrap().1.message().to_string())
            .collect()
    }

    #[rstest]
    fn walks_newest_first_down_to_the_root(history: History) {
        let rev_list = RevList::new(&history.database, history.commits.last().cloned());

        assert_eq!(messages(&rev_list), vec!["third", "second", "first"]);
    }

    #[rstest]
    fn traversal_can_be_restarted(history: History) {
        let rev_list = RevList::new(&history.database, Some(history.commits[1].clone()));

        let first_pass = messages(&rev_list);
        let second_pass = messages(&rev_list);

        assert_eq!(first_pass, vec!["second", "first"]);
        assert_eq!(first_pass, second_pass);
    }

    #[rstest]
    fn unborn_start_yields_nothing(history: History) {
        assert_eq!(RevList::new(&history.database, None).iter().count(), 0);
    }

    #[rstest]
    fn ids_match_the_commits_they_accompany(history: History) {
        let rev_list = RevList::new(&history.database, history.commits.last().cloned());

        for item in &rev_list {
            let (oid, commit) = item.unwrap();
            assert_eq!(commit.object_id().unwrap(), oid);
        }
    }

    #[rstest]
    fn missing_commit_surfaces_an_error(history: History) {
        let missing = ObjectId::from_canonical_bytes(b"commit 0\0");
        let mut iter = RevList::new(&history.database, Some(missing)).iter();

        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
