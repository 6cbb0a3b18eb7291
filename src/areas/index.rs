//! Index (staging area)
//!
//! The index tracks which content the next commit will contain, along with
//! the stat data of each file at the moment it was staged.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: signature, version and entry count
//! - Entries: path-sorted list of staged files with metadata
//! - Checksum: SHA-1 of everything before it
//!
//! Saving writes `index.lock`, fsyncs it and renames it over `index`, so an
//! interrupted save leaves the previous valid index in place.
//!
//! ## Data Structures
//!
//! - `entries`: maps file paths to their index entries
//! - `children`: maps directory paths to the entries below them

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{JitError, Result};
use anyhow::{Context, anyhow};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.jit/index`)
    path: Box<Path>,
    entries: BTreeMap<Box<Path>, IndexEntry>,
    /// Directory hierarchy for parent-child lookups
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    /// Set when the in-memory index diverges from what was loaded
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    /// Load the index from disk
    ///
    /// A missing file is an empty index. Anything unreadable (bad signature,
    /// truncation, checksum mismatch) is reported as `IndexCorrupt`.
    pub fn load(&mut self) -> Result<()> {
        self.clear();

        let index_file = match std::fs::File::open(self.path()) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(JitError::Io(error)),
        };

        let mut reader = Checksum::new(BufReader::new(index_file));
        self.parse(&mut reader)
            .map_err(|error| JitError::IndexCorrupt(format!("{error:#}")))?;
        tracing::debug!(entries = self.entries.len(), "loaded index");

        Ok(())
    }

    fn parse(&mut self, reader: &mut Checksum<BufReader<std::fs::File>>) -> anyhow::Result<()> {
        let entries_count = self.parse_header(reader)?;
        self.parse_entries(entries_count, reader)?;

        reader.verify()
    }

    /// True when the path is a staged file or a directory containing staged files
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries.contains_key(path) || self.children.contains_key(path)
    }

    fn parse_header(&self, reader: &mut Checksum<BufReader<std::fs::File>>) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        Ok(header.entries_count)
    }

    /// Parse all entries, each read in 8-byte blocks until its NUL padding
    fn parse_entries(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<BufReader<std::fs::File>>,
    ) -> anyhow::Result<()> {
        let mut previous: Option<PathBuf> = None;

        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();

            while entry_bytes[entry_bytes.len() - 1] != 0 {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(std::io::Cursor::new(entry_bytes))?;

            if let Some(previous) = &previous
                && previous >= &entry.name
            {
                return Err(anyhow!(
                    "Index entries out of order: {} before {}",
                    previous.display(),
                    entry.name.display()
                ));
            }
            previous = Some(entry.name.clone());

            self.store_entry(&entry);
        }

        Ok(())
    }

    fn store_entry(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_owned().into_boxed_path())
                .or_default()
                .insert(entry.name.clone().into_boxed_path());
        }

        self.entries
            .insert(entry.name.clone().into_boxed_path(), entry.clone());
    }

    fn remove_children(&mut self, path_name: &Path) -> usize {
        match self.children.remove(path_name) {
            Some(children) => children
                .into_iter()
                .filter(|child| self.remove_entry(child))
                .count(),
            None => 0,
        }
    }

    fn remove_entry(&mut self, path_name: &Path) -> bool {
        match self.entries.remove(path_name) {
            None => false,
            Some(entry) => {
                for parent in entry.parent_dirs() {
                    if let Some(children) = self.children.get_mut(parent) {
                        children.remove(path_name);
                        if children.is_empty() {
                            self.children.remove(parent);
                        }
                    }
                }

                true
            }
        }
    }

    /// Insert or replace the entry for a path
    ///
    /// A file staged at `a` next to existing entries under `a/` is kept as is;
    /// the conflict surfaces when a tree is built from the index.
    pub fn add(&mut self, entry: IndexEntry) {
        self.remove_entry(&entry.name.clone());
        self.store_entry(&entry);

        self.changed = true;
    }

    /// Remove the entry at `path` or every entry beneath it, returning how many went
    pub fn remove(&mut self, path: &Path) -> usize {
        let removed = usize::from(self.remove_entry(path)) + self.remove_children(path);

        if removed > 0 {
            self.changed = true;
        }

        removed
    }

    /// Persist the index atomically
    pub fn save(&mut self) -> Result<()> {
        let lock_path = self.path.with_extension("lock");
        let lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Unable to open {}", lock_path.display()))?;

        let mut writer = Checksum::new(std::io::BufWriter::new(lock_file));

        writer.write(&IndexHeader::for_entries(self.entries.len())?.serialize()?)?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;

        let lock_file = writer
            .into_inner()
            .into_inner()
            .map_err(|error| anyhow!("Unable to flush index: {}", error.error()))?;
        lock_file.sync_all()?;

        std::fs::rename(&lock_path, &self.path)
            .with_context(|| format!("Unable to replace {}", self.path.display()))?;

        self.changed = false;
        tracing::debug!(entries = self.entries.len(), "saved index");

        Ok(())
    }

    /// Entries ordered by path
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = IndexEntry> {
        self.entries.into_values()
    }

    /// Paths of the entry at `path` or beneath it; the empty path matches everything
    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|entry_path| path.as_os_str().is_empty() || entry_path.starts_with(path))
            .map(|p| p.to_path_buf())
            .collect()
    }
}
