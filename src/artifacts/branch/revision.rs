use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{BranchName, RefName};
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::{OBJECT_ID_LENGTH, SHORT_OBJECT_ID_MIN_LENGTH};
use crate::errors::{JitError, Result};

/// A textual expression naming a commit
///
/// Supported forms:
/// - `HEAD`, or its alias `@`
/// - branch or tag names: `master`, `feature/x`, `v1.0`
/// - full or abbreviated (at least 4 hex digits) object ids
/// - parent notation: `<revision>^`
/// - ancestor notation: `<revision>~<n>`
///
/// Names are looked up as branches first, then tags, and only then as object
/// ids, so a branch called `cafe` wins over a commit whose id starts with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Head,
    Ref(BranchName),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_REGEX).map_err(anyhow::Error::from)?;
        let ancestor_regex = regex::Regex::new(ANCESTOR_REGEX).map_err(anyhow::Error::from)?;

        if let Some(caps) = parent_regex.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;
            return Ok(Revision::Parent(Box::new(base_revision)));
        }

        if let Some(caps) = ancestor_regex.captures(revision) {
            let generations = caps[2]
                .parse::<usize>()
                .map_err(|_| JitError::UnknownRevision(revision.to_string()))?;
            let base_revision = Self::try_parse(&caps[1])?;
            return Ok(Revision::Ancestor(Box::new(base_revision), generations));
        }

        let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
        if resolved_name == "HEAD" {
            return Ok(Revision::Head);
        }

        BranchName::try_parse(resolved_name.to_string())
            .map(Revision::Ref)
            .map_err(|_| JitError::UnknownRevision(revision.to_string()))
    }

    /// Resolve to the id of a commit
    pub fn resolve(&self, repository: &Repository) -> Result<ObjectId> {
        match self {
            Revision::Head => repository
                .refs()
                .head_commit()?
                .ok_or_else(|| JitError::UnknownRevision(self.to_string())),
            Revision::Ref(name) => Self::resolve_name(name, repository),
            Revision::Parent(base_revision) => {
                let oid = base_revision.resolve(repository)?;
                Self::resolve_commit_parent(&oid, repository)?
                    .ok_or_else(|| JitError::UnknownRevision(self.to_string()))
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::resolve_commit_parent(&oid, repository)?
                        .ok_or_else(|| JitError::UnknownRevision(self.to_string()))?;
                }

                Ok(oid)
            }
        }
    }

    /// The branch this revision designates, if it is a bare existing branch name
    pub fn branch(&self, repository: &Repository) -> Option<BranchName> {
        match self {
            Revision::Ref(name) if repository.refs().exists(&RefName::Branch(name.clone())) => {
                Some(name.clone())
            }
            _ => None,
        }
    }

    fn resolve_name(name: &BranchName, repository: &Repository) -> Result<ObjectId> {
        for ref_name in [RefName::Branch(name.clone()), RefName::Tag(name.clone())] {
            if let Some(oid) = repository.refs().read(&ref_name)? {
                return Ok(oid);
            }
        }

        if !Self::looks_like_oid(name.as_ref()) {
            return Err(JitError::UnknownRevision(name.to_string()));
        }

        let oid = resolve_object_id(repository, name.as_ref(), Some(ObjectType::Commit))?;
        let actual = repository.database().get_object_type(&oid)?;
        if actual != ObjectType::Commit {
            return Err(JitError::ObjectTypeMismatch {
                oid,
                expected: ObjectType::Commit,
                actual,
            });
        }

        Ok(oid)
    }

    fn resolve_commit_parent(oid: &ObjectId, repository: &Repository) -> Result<Option<ObjectId>> {
        let commit = repository.database().parse_object_as_commit(oid)?;
        Ok(commit.parent().cloned())
    }

    fn looks_like_oid(s: &str) -> bool {
        s.len() >= SHORT_OBJECT_ID_MIN_LENGTH
            && s.len() <= OBJECT_ID_LENGTH
            && s.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Head => write!(f, "HEAD"),
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}

/// Expand a full or abbreviated object id
///
/// When a prefix matches several objects, `preferred` narrows the candidates
/// to one object type before the prefix is declared ambiguous.
pub fn resolve_object_id(
    repository: &Repository,
    id: &str,
    preferred: Option<ObjectType>,
) -> Result<ObjectId> {
    if id.len() < SHORT_OBJECT_ID_MIN_LENGTH
        || id.len() > OBJECT_ID_LENGTH
        || !id.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(JitError::UnknownRevision(id.to_string()));
    }

    if id.len() == OBJECT_ID_LENGTH {
        let oid = ObjectId::try_parse(id.to_string())?;
        if !repository.database().exists(&oid) {
            return Err(JitError::ObjectNotFound(oid));
        }
        return Ok(oid);
    }

    let mut candidates = repository.database().find_objects_by_prefix(id)?;

    if candidates.len() > 1
        && let Some(preferred) = preferred
    {
        let preferred_candidates = candidates
            .iter()
            .filter(|oid| {
                repository
                    .database()
                    .get_object_type(oid)
                    .map(|object_type| object_type == preferred)
                    .unwrap_or(false)
            })
            .cloned()
            .collect::<Vec<_>>();

        if preferred_candidates.len() == 1 {
            candidates = preferred_candidates;
        }
    }

    match candidates.len() {
        0 => Err(JitError::UnknownRevision(id.to_string())),
        1 => Ok(candidates.remove(0)),
        _ => Err(JitError::AmbiguousRevision {
            prefix: id.to_string(),
            candidates,
        }),
    }
}
