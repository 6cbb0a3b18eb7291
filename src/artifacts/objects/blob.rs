//! Blob object
//!
//! Blobs store file content. They carry no metadata such as the file name or
//! permissions; those belong to the tree entry (or index entry) that points at
//! the blob.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

/// Number of leading bytes inspected by the binary-content heuristic
pub const BINARY_SNIFF_LENGTH: usize = 8000;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }

    /// Content is considered binary when a NUL byte shows up early on
    pub fn is_binary(&self) -> bool {
        is_binary(&self.content)
    }
}

pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_SNIFF_LENGTH).any(|&b| b == 0)
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(self.content.clone())
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        Ok(Self::new(content.into()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_byte_marks_content_as_binary() {
        assert!(Blob::new(Bytes::from_static(b"PNG\0\x01\x02")).is_binary());
        assert!(!Blob::new(Bytes::from_static(b"plain text\n")).is_binary());
    }

    #[test]
    fn nul_past_sniff_window_is_ignored() {
        let mut content = vec![b'a'; BINARY_SNIFF_LENGTH];
        content.push(0);

        assert!(!is_binary(&content));
    }
}
