//! Commit object
//!
//! Commits record a snapshot of the repository at a point in time:
//! - The root tree id (directory snapshot)
//! - Parent commit id(s) (none for a root commit)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::BufRead;

pub const AUTHOR_NAME_ENV: &str = "JIT_AUTHOR_NAME";
pub const AUTHOR_EMAIL_ENV: &str = "JIT_AUTHOR_EMAIL";
pub const AUTHOR_DATE_ENV: &str = "JIT_AUTHOR_DATE";

/// Author or committer identity plus the moment of authorship
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Header form: "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load author information from environment variables
    ///
    /// Reads `JIT_AUTHOR_NAME`, `JIT_AUTHOR_EMAIL` and optionally `JIT_AUTHOR_DATE`
    /// (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`). Without a date the current time is used.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let name = std::env::var(AUTHOR_NAME_ENV)
            .with_context(|| format!("{AUTHOR_NAME_ENV} not set"))?;
        let email = std::env::var(AUTHOR_EMAIL_ENV)
            .with_context(|| format!("{AUTHOR_EMAIL_ENV} not set"))?;

        match std::env::var(AUTHOR_DATE_ENV) {
            Ok(date_str) => {
                let timestamp = chrono::DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| {
                        chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z")
                    })
                    .with_context(|| format!("{AUTHOR_DATE_ENV} is not a valid date: {date_str}"))?;
                Ok(Author::new_with_timestamp(name, email, timestamp))
            }
            Err(_) => Ok(Author::new(name, email)),
        }
    }

    /// Timestamp in log form, e.g. "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "name <email> timestamp timezone", split from the right since names have spaces
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1];
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;
        if email_end < email_start {
            return Err(anyhow::anyhow!("Invalid author format: misplaced '>'"));
        }

        let name = name_email_part[..email_start].trim_end().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let timestamp =
            chrono::DateTime::parse_from_str(&format!("{timestamp} {timezone}"), "%s %z")
                .map_err(|_| anyhow::anyhow!("Invalid timestamp or timezone"))?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// A node of the commit graph
///
/// Commits refer to their parents and tree by id only; the graph lives in the
/// object store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ids (empty for a root commit)
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a new commit; the author also acts as committer
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    /// First line of the message, for `log --oneline`
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.display()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let content = String::from_utf8(content).context("Commit payload is not UTF-8")?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;
        let mut lines = headers.lines();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .context("Invalid commit object: missing tree line")?;
        let tree_oid = ObjectId::try_parse(tree_oid.to_string())?;

        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing author line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing author line")?;
        }

        let author = next_line
            .strip_prefix("author ")
            .context("Invalid commit object: invalid author line")?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .context("Invalid commit object: missing committer line")?;
        let committer = Author::try_from(committer)?;

        if lines.next().is_some() {
            anyhow::bail!("Invalid commit object: unexpected header line");
        }

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid.as_ref()));
        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn author() -> Author {
        let timestamp =
            chrono::DateTime::parse_from_str("2023-01-01 12:00:00 +0200", "%Y-%m-%d %H:%M:%S %z")
                .unwrap();
        Author::new_with_timestamp("Ada Lovelace".into(), "ada@example.com".into(), timestamp)
    }

    #[fixture]
    fn tree_oid() -> ObjectId {
        ObjectId::from_canonical_bytes(b"tree 0\0")
    }

    #[rstest]
    fn author_header_round_trips(author: Author) {
        let parsed = Author::try_from(author.display().as_str()).unwrap();

        assert_eq!(parsed, author);
        assert_eq!(parsed.display(), "Ada Lovelace <ada@example.com> 1672567200 +0200");
    }

    #[rstest]
    #[case("first line")]
    #[case("subject\n\nbody with\n\nblank lines\n")]
    #[case("  padded  \n")]
    fn message_round_trips_byte_for_byte(
        author: Author,
        tree_oid: ObjectId,
        #[case] message: &str,
    ) {
        let parent = ObjectId::from_canonical_bytes(b"commit 0\0");
        let commit = Commit::new(vec![parent], tree_oid, author, message.to_string());

        let payload = commit.serialize().unwrap();
        let parsed = Commit::deserialize(std::io::Cursor::new(payload)).unwrap();

        assert_eq!(parsed.message(), message);
        assert_eq!(parsed, commit);
        assert_eq!(parsed.object_id().unwrap(), commit.object_id().unwrap());
    }

    #[rstest]
    fn root_commit_has_no_parent_lines(author: Author, tree_oid: ObjectId) {
        let commit = Commit::new(vec![], tree_oid.clone(), author, "root".into());
        let payload = String::from_utf8(commit.serialize().unwrap().to_vec()).unwrap();

        assert!(commit.is_root());
        assert!(payload.starts_with(&format!("tree {tree_oid}\nauthor ")));
        assert!(!payload.contains("parent "));
    }

    #[rstest]
    fn short_message_is_first_line(author: Author, tree_oid: ObjectId) {
        let commit = Commit::new(vec![], tree_oid, author, "subject\n\nbody".into());

        assert_eq!(commit.short_message(), "subject");
    }

    #[test]
    fn missing_separator_is_rejected() {
        let payload = "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\nauthor a <b> 0 +0000";

        assert!(Commit::deserialize(std::io::Cursor::new(payload)).is_err());
    }
}
