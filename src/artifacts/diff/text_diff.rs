//! Line-level diff between two blobs
//!
//! Lines are aligned with a longest-common-subsequence table. The common
//! prefix and suffix are stripped first, so the table only covers the region
//! that actually differs, and only a square-root share of its rows is held in
//! memory at any time. When several alignments are equally long, the one
//! that deletes before it inserts wins, which keeps every hunk in the familiar
//! `-old` then `+new` order.

use crate::artifacts::objects::blob::is_binary;
use std::collections::BTreeMap;

/// Unchanged lines shown around each change
pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDiff {
    /// At least one side looks binary; only "they differ" can be reported
    Binary,
    /// Empty when both sides hold the same lines
    Hunks(Vec<Hunk>),
}

impl TextDiff {
    pub fn is_empty(&self) -> bool {
        matches!(self, TextDiff::Hunks(hunks) if hunks.is_empty())
    }
}

/// A line as it appears in a hunk, trailing newline included when present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Context(String),
    Deleted(String),
    Inserted(String),
}

impl Line {
    pub fn text(&self) -> &str {
        match self {
            Line::Context(text) | Line::Deleted(text) | Line::Inserted(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<Line>,
}

impl Hunk {
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Equal,
    Delete,
    Insert,
}

/// One step of the edit script, with the number of old and new lines
/// consumed before it
#[derive(Debug, Clone, Copy)]
struct Edit<'a> {
    kind: EditKind,
    old_pos: usize,
    new_pos: usize,
    text: &'a str,
}

pub fn text_diff(old: &[u8], new: &[u8]) -> TextDiff {
    if is_binary(old) || is_binary(new) {
        return TextDiff::Binary;
    }

    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);
    let old_lines = old_text.split_inclusive('\n').collect::<Vec<_>>();
    let new_lines = new_text.split_inclusive('\n').collect::<Vec<_>>();

    let edits = edit_script(&old_lines, &new_lines);
    TextDiff::Hunks(group_hunks(&edits))
}

fn edit_script<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Edit<'a>> {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut edits = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (0, 0);
    let mut push = |kind: EditKind, i: usize, j: usize, text: &'a str| {
        edits.push(Edit {
            kind,
            old_pos: i,
            new_pos: j,
            text,
        })
    };

    for &line in &old[..prefix] {
        push(EditKind::Equal, i, j, line);
        i += 1;
        j += 1;
    }

    let (n, m) = (old_mid.len(), new_mid.len());
    let mut lcs = LcsRows::new(old_mid, new_mid);

    let (mut x, mut y) = (0, 0);
    while x < n || y < m {
        if x < n && y < m && old_mid[x] == new_mid[y] {
            push(EditKind::Equal, i, j, old_mid[x]);
            x += 1;
            y += 1;
            i += 1;
            j += 1;
        } else if x < n && (y == m || lcs.get(x + 1, y) >= lcs.get(x, y + 1)) {
            push(EditKind::Delete, i, j, old_mid[x]);
            x += 1;
            i += 1;
        } else {
            push(EditKind::Insert, i, j, new_mid[y]);
            y += 1;
            j += 1;
        }
    }

    for &line in &old[old.len() - suffix..] {
        push(EditKind::Equal, i, j, line);
        i += 1;
        j += 1;
    }

    edits
}

/// Suffix LCS lengths: `get(x, y)` is the LCS length of `old[x..]` and `new[y..]`
///
/// Only every `stride`-th row is kept from the initial bottom-up pass. The rows
/// of one block are rebuilt from the checkpoint below it when the walk enters
/// the block, so memory stays at about `2 * sqrt(n)` rows instead of `n`.
struct LcsRows<'s, 'a> {
    old: &'s [&'a str],
    new: &'s [&'a str],
    stride: usize,
    /// Rows `0, stride, 2 * stride, ...` and row `old.len()`
    checkpoints: BTreeMap<usize, Vec<u32>>,
    block_start: usize,
    /// Rows `block_start..=block_start + block.len() - 1`
    block: Vec<Vec<u32>>,
}

impl<'s, 'a> LcsRows<'s, 'a> {
    fn new(old: &'s [&'a str], new: &'s [&'a str]) -> Self {
        let n = old.len();
        let stride = n.isqrt().max(1);

        let mut row = vec![0; new.len() + 1];
        let mut checkpoints = BTreeMap::from([(n, row.clone())]);
        for x in (0..n).rev() {
            row = Self::row_above(old, new, x, &row);
            if x % stride == 0 {
                checkpoints.insert(x, row.clone());
            }
        }

        LcsRows {
            old,
            new,
            stride,
            checkpoints,
            block_start: 0,
            block: Vec::new(),
        }
    }

    /// Row `x` computed from row `x + 1`
    fn row_above(old: &[&str], new: &[&str], x: usize, below: &[u32]) -> Vec<u32> {
        let mut row = vec![0; new.len() + 1];
        for y in (0..new.len()).rev() {
            row[y] = if old[x] == new[y] {
                below[y + 1] + 1
            } else {
                below[y].max(row[y + 1])
            };
        }

        row
    }

    fn get(&mut self, x: usize, y: usize) -> u32 {
        if let Some(row) = self.checkpoints.get(&x) {
            return row[y];
        }

        if x < self.block_start || x >= self.block_start + self.block.len() {
            self.load_block(x);
        }
        self.block[x - self.block_start][y]
    }

    /// Rebuild every row from the checkpoint at or above `x` down to the next one
    fn load_block(&mut self, x: usize) {
        let start = x - x % self.stride;
        let end = (start + self.stride).min(self.old.len());

        let mut rows = vec![self.checkpoints[&end].clone()];
        for row_x in (start..end).rev() {
            let row = Self::row_above(self.old, self.new, row_x, &rows[rows.len() - 1]);
            rows.push(row);
        }
        rows.reverse();

        self.block_start = start;
        self.block = rows;
    }
}

fn group_hunks(edits: &[Edit<'_>]) -> Vec<Hunk> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    for (position, edit) in edits.iter().enumerate() {
        if edit.kind == EditKind::Equal {
            continue;
        }

        let start = position.saturating_sub(CONTEXT_LINES);
        let end = (position + 1 + CONTEXT_LINES).min(edits.len());
        match ranges.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = end,
            _ => ranges.push((start, end)),
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| build_hunk(&edits[start..end]))
        .collect()
}

fn build_hunk(edits: &[Edit<'_>]) -> Hunk {
    let first = edits[0];
    let old_len = edits.iter().filter(|e| e.kind != EditKind::Insert).count();
    let new_len = edits.iter().filter(|e| e.kind != EditKind::Delete).count();

    let lines = edits
        .iter()
        .map(|edit| {
            let text = edit.text.to_string();
            match edit.kind {
                EditKind::Equal => Line::Context(text),
                EditKind::Delete => Line::Deleted(text),
                EditKind::Insert => Line::Inserted(text),
            }
        })
        .collect();

    // an empty side is anchored on the line before it
    Hunk {
        old_start: if old_len == 0 { first.old_pos } else { first.old_pos + 1 },
        old_len,
        new_start: if new_len == 0 { first.new_pos } else { first.new_pos + 1 },
        new_len,
        lines,
    }
}
