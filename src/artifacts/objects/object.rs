use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Encodes an object's payload (header excluded)
pub trait Packable {
    fn serialize(&self) -> anyhow::Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn to_raw(&self) -> anyhow::Result<RawObject> {
        Ok(RawObject::new(self.object_type(), self.serialize()?))
    }

    fn object_id(&self) -> anyhow::Result<ObjectId> {
        self.to_raw()?.object_id()
    }
}

/// Type tag plus payload, exactly as addressed and stored
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RawObject {
    pub object_type: ObjectType,
    pub payload: Bytes,
}

impl RawObject {
    /// Canonical serialization: `<type> <size>\0<payload>`
    pub fn encode(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(self.payload.len() + 32);
        let header = format!("{} {}\0", self.object_type.as_str(), self.payload.len());
        bytes.write_all(header.as_bytes())?;
        bytes.write_all(&self.payload)?;

        Ok(Bytes::from(bytes))
    }

    pub fn decode(bytes: Bytes) -> anyhow::Result<Self> {
        let space = bytes
            .iter()
            .position(|&b| b == b' ')
            .context("missing type separator in object header")?;
        let nul = bytes
            .iter()
            .position(|&b| b == 0)
            .context("missing NUL terminator in object header")?;
        if nul < space {
            anyhow::bail!("malformed object header");
        }

        let object_type = ObjectType::try_from(std::str::from_utf8(&bytes[..space])?)?;
        let size = std::str::from_utf8(&bytes[space + 1..nul])?
            .parse::<usize>()
            .context("invalid object size")?;

        let payload = bytes.slice(nul + 1..);
        if payload.len() != size {
            anyhow::bail!(
                "object size mismatch: header says {size}, payload has {}",
                payload.len()
            );
        }

        Ok(RawObject::new(object_type, payload))
    }

    pub fn object_id(&self) -> anyhow::Result<ObjectId> {
        Ok(ObjectId::from_canonical_bytes(&self.encode()?))
    }
}

#[derive(Debug)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    Tag(Bytes),
}

impl ObjectBox {
    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
            ObjectBox::Tag(payload) => String::from_utf8_lossy(payload).to_string(),
        }
    }
}
