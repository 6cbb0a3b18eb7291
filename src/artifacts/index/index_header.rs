use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::{anyhow, bail};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{BufRead, Write};

/// `JIDX`, format version and entry count
///
/// Reading a header validates the signature and version, so a parsed header
/// always describes an index this build can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn for_entries(entries_count: usize) -> anyhow::Result<Self> {
        let entries_count = u32::try_from(entries_count)
            .map_err(|_| anyhow!("Too many index entries: {entries_count}"))?;

        Ok(IndexHeader { entries_count })
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(SIGNATURE.as_bytes())?;
        bytes.write_u32::<NetworkEndian>(VERSION)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut signature = [0u8; 4];
        reader
            .read_exact(&mut signature)
            .map_err(|_| anyhow!("Index header is truncated"))?;
        if signature != SIGNATURE.as_bytes() {
            bail!("Invalid index file signature");
        }

        let version = reader.read_u32::<NetworkEndian>()?;
        if version != VERSION {
            bail!("Unsupported index file version: {version}");
        }

        Ok(IndexHeader {
            entries_count: reader.read_u32::<NetworkEndian>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn header_starts_with_signature_and_version() {
        let bytes = IndexHeader::for_entries(3).unwrap().serialize().unwrap();

        assert_eq!(&bytes[..], b"JIDX\0\0\0\x01\0\0\0\x03");
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let error = IndexHeader::deserialize(Cursor::new(b"DIRC\0\0\0\x02\0\0\0\0")).unwrap_err();

        assert_eq!(error.to_string(), "Invalid index file signature");
    }

    #[test]
    fn newer_version_is_rejected() {
        let error = IndexHeader::deserialize(Cursor::new(b"JIDX\0\0\0\x02\0\0\0\0")).unwrap_err();

        assert_eq!(error.to_string(), "Unsupported index file version: 2");
    }
}
