//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path (repository-relative, `/` separated)
//! - Blob id of the staged content
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! Entries are stored in a binary format with 8-byte alignment. The stat data
//! (size and timestamps) lets the workspace comparison skip hashing files whose
//! metadata has not moved since they were staged.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Maximum path length recorded in the entry flags
const MAX_PATH_SIZE: usize = 0xfff;

/// Size of the fixed-width part of an entry (stat fields, oid, flags)
const ENTRY_FIXED_SIZE: usize = 46;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 48;

/// Index entry representing a staged file
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: PathBuf,
    /// Blob id of the staged content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name"))
    }

    /// Every proper ancestor directory of the entry, outermost first
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();

        dirs
    }

    /// Size and mtime agree with a fresh stat of the workspace file
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.size == other.size
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    pub fn mode(&self) -> EntryMode {
        self.metadata.mode
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Stat data stored in index entries
///
/// - `ctime`: file status change time
/// - `mtime`: file content modification time
///
/// Both carry nanosecond precision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub mode: EntryMode,
    pub size: u64,
}

impl EntryMetadata {
    /// Metadata for an entry that has never been stat'ed, e.g. one restored from a tree
    pub fn with_mode(mode: EntryMode) -> Self {
        EntryMetadata {
            mode,
            ..Default::default()
        }
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid entry name"))?;
        let flags = min(entry_name.len(), MAX_PATH_SIZE) as u16;

        let mut entry_bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + entry_name.len() + ENTRY_BLOCK);
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags)?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // at least one NUL terminates the path, the rest pads to a block boundary
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("Invalid index entry size"));
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&bytes[16..20]))?;
        let size = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let oid = ObjectId::read_h40_from(&mut &bytes[24..44])?;
        let _flags = byteorder::NetworkEndian::read_u16(&bytes[44..46]);

        if mode.is_tree() {
            return Err(anyhow::anyhow!("Index entries cannot be directories"));
        }

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("Missing null terminator in entry name"))?;
        if name_end == 0 {
            return Err(anyhow::anyhow!("Empty entry name"));
        }
        let name_bytes = &bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| anyhow::anyhow!("Invalid UTF-8 in entry name"))?,
        );

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                mode,
                size,
            },
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        if metadata.is_dir() {
            return Err(anyhow::anyhow!(
                "{} is a directory, not a file",
                file_path.display()
            ));
        }

        let mode = match file_path.is_executable() {
            true => EntryMode::File(FileMode::Executable),
            false => EntryMode::File(FileMode::Regular),
        };

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            mode,
            size: metadata.size(),
        })
    }
}
