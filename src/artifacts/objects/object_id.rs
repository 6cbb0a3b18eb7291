//! Object identifier (SHA-1 digest)
//!
//! Object ids are 40-character lowercase hexadecimal strings. They identify
//! blobs, trees, commits and tags, and double as the storage key.
//!
//! ## Storage
//!
//! Objects live at `.jit/objects/<first-2-chars>/<remaining-38-chars>`, so no
//! shard directory grows past a 256th of the store.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use sha1::{Digest, Sha1};
use std::io;
use std::path::PathBuf;

/// SHA-1 object identifier in hexadecimal form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string
    ///
    /// Upper-case digits are normalized so that ids compare equal regardless of
    /// how they were typed.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Digest of an already-serialized object (header included)
    pub fn from_canonical_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(bytes);

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Write the object id in binary format (20 bytes)
    ///
    /// Used when serializing tree entries and index entries.
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an object id from binary format (20 bytes)
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut raw)?;

        let hex40 = raw.iter().map(|byte| format!("{byte:02x}")).collect();
        Self::try_parse(hex40)
    }

    /// Convert to the sharded storage path, `ab/c123...` for `abc123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("zz3456789012345678901234567890123456789z")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        assert!(ObjectId::try_parse(raw.to_string()).is_err());
    }

    #[test]
    fn binary_form_round_trips() {
        let oid = ObjectId::from_canonical_bytes(b"blob 5\0hello");

        let mut raw = Vec::new();
        oid.write_h40_to(&mut raw).unwrap();
        assert_eq!(raw.len(), 20);

        let parsed = ObjectId::read_h40_from(&mut raw.as_slice()).unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn storage_path_is_sharded_by_prefix() {
        let oid = ObjectId::from_canonical_bytes(b"blob 5\0hello");
        let (dir, file) = oid.as_ref().split_at(2);

        assert_eq!(oid.to_path(), PathBuf::from(dir).join(file));
    }

    #[test]
    fn matches_well_known_digest_of_hello() {
        let oid = ObjectId::from_canonical_bytes(b"blob 5\0hello");
        assert_eq!(oid.as_ref(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
    }
}
