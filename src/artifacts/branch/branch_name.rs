use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::{JitError, Result};
use std::path::PathBuf;

pub const HEADS_PREFIX: &str = "refs/heads/";
pub const TAGS_PREFIX: &str = "refs/tags/";

/// Target of a symbolic ref, e.g. `refs/heads/master` inside `HEAD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn new(name: String) -> Self {
        SymRefName(name)
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

/// Validated short name of a branch or tag (`master`, `feature/x`, `v1.0`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> Result<Self> {
        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX).map_err(anyhow::Error::from)?;

        if name.is_empty() || name == "HEAD" || re.is_match(&name) {
            return Err(JitError::InvalidRefName(name));
        }

        Ok(Self(name))
    }

    pub fn try_parse_sym_ref_name(sym_ref_name: &SymRefName) -> Result<Self> {
        match sym_ref_name.0.strip_prefix(HEADS_PREFIX) {
            Some(name) => Self::try_parse(name.to_string()),
            None => Err(JitError::InvalidRefName(sym_ref_name.0.clone())),
        }
    }

    pub fn to_sym_ref_name(&self) -> SymRefName {
        SymRefName(format!("{HEADS_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two ref namespaces under `refs/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefNamespace {
    Heads,
    Tags,
}

impl RefNamespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            RefNamespace::Heads => HEADS_PREFIX,
            RefNamespace::Tags => TAGS_PREFIX,
        }
    }
}

/// A fully qualified ref: namespace plus short name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefName {
    Branch(BranchName),
    Tag(BranchName),
}

impl RefName {
    pub fn namespace(&self) -> RefNamespace {
        match self {
            RefName::Branch(_) => RefNamespace::Heads,
            RefName::Tag(_) => RefNamespace::Tags,
        }
    }

    pub fn short_name(&self) -> &BranchName {
        match self {
            RefName::Branch(name) | RefName::Tag(name) => name,
        }
    }

    /// Path relative to the repository directory, e.g. `refs/tags/v1`
    pub fn as_ref_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.namespace().prefix(), self.short_name()))
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.namespace().prefix(), self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;
    use rstest::rstest;

    proptest! {
        #[test]
        fn alphanumeric_names_are_valid(branch_name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn hierarchical_names_are_valid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}/{suffix}")).is_ok());
        }

        #[test]
        fn names_starting_with_dot_are_invalid(suffix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!(".{suffix}")).is_err());
        }

        #[test]
        fn names_ending_with_lock_are_invalid(prefix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("{prefix}.lock")).is_err());
        }

        #[test]
        fn consecutive_dots_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}..{suffix}")).is_err());
        }

        #[test]
        fn special_characters_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special_char in r"[\*:\?\[\\^~ ]"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}{special_char}{suffix}")).is_err());
        }
    }

    #[rstest]
    #[case("")]
    #[case("HEAD")]
    #[case("/leading")]
    #[case("trailing/")]
    #[case("a/.hidden")]
    #[case("at@{brace")]
    #[case("nul\0byte")]
    fn rejects_invalid_names(#[case] name: &str) {
        assert!(matches!(
            BranchName::try_parse(name.to_string()),
            Err(JitError::InvalidRefName(_))
        ));
    }

    #[test]
    fn ref_paths_are_namespaced() {
        let name = BranchName::try_parse("feature/x".to_string()).unwrap();

        assert_eq!(
            RefName::Branch(name.clone()).as_ref_path(),
            PathBuf::from("refs/heads/feature/x")
        );
        assert_eq!(RefName::Tag(name.clone()).to_string(), "refs/tags/feature/x");
        assert_eq!(
            BranchName::try_parse_sym_ref_name(&name.to_sym_ref_name()).unwrap(),
            name
        );
    }
}
