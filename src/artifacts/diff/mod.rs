//! Diff algorithms and tree comparison
//!
//! - `tree_diff`: which paths changed between two snapshots (trees, the
//!   index, or the working directory)
//! - `diff_target`: loads one side of a file-level comparison
//! - `text_diff`: what changed inside a file, as context hunks
//!
//! Every change is reported as a [`tree_diff::PathChange`], whatever the two
//! sides being compared are.

pub mod diff_target;
pub mod text_diff;
pub mod tree_diff;

use crate::artifacts::diff::tree_diff::ChangeKind;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ChangeFilter: u32 {
        const ADDED = 0b001;
        const REMOVED = 0b010;
        const MODIFIED = 0b100;
    }
}

impl ChangeFilter {
    /// Parse a `--diff-filter` value such as `AM` or `D`
    pub fn try_parse(s: &str) -> Option<Self> {
        let mut filter = Self::empty();

        for c in s.chars() {
            match c {
                'A' => filter |= Self::ADDED,
                'D' => filter |= Self::REMOVED,
                'M' => filter |= Self::MODIFIED,
                _ => return None,
            }
        }

        if filter.is_empty() { None } else { Some(filter) }
    }

    pub fn matches(&self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::Added => self.contains(Self::ADDED),
            ChangeKind::Removed => self.contains(Self::REMOVED),
            ChangeKind::Modified => self.contains(Self::MODIFIED),
            ChangeKind::Unchanged => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("A", ChangeFilter::ADDED)]
    #[case("MD", ChangeFilter::MODIFIED | ChangeFilter::REMOVED)]
    #[case("AMD", ChangeFilter::all())]
    fn parses_filter_letters(#[case] raw: &str, #[case] expected: ChangeFilter) {
        assert_eq!(ChangeFilter::try_parse(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("R")]
    #[case("a")]
    fn rejects_unknown_letters(#[case] raw: &str) {
        assert_eq!(ChangeFilter::try_parse(raw), None);
    }

    #[test]
    fn unchanged_never_matches() {
        assert!(!ChangeFilter::all().matches(ChangeKind::Unchanged));
        assert!(ChangeFilter::ADDED.matches(ChangeKind::Added));
        assert!(!ChangeFilter::ADDED.matches(ChangeKind::Removed));
    }
}
