//! Content-addressable object store
//!
//! Objects are stored uncompressed at `objects/<2 hex>/<38 hex>`, holding the
//! canonical `<type> <size>\0<payload>` bytes. Files are written once through a
//! temp file in the shard directory, fsynced and renamed into place, and never
//! modified afterwards.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, RawObject, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{JitError, Result};
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Persist a payload under its digest unless already present
    ///
    /// When the object already exists its bytes are re-read and compared; a
    /// mismatch means the stored copy is damaged and is reported, never
    /// overwritten.
    pub fn put(&self, object_type: ObjectType, payload: Bytes) -> Result<ObjectId> {
        let raw = RawObject::new(object_type, payload);
        let content = raw.encode()?;
        let oid = ObjectId::from_canonical_bytes(&content);
        let object_path = self.object_path(&oid);

        if object_path.exists() {
            let stored = self.read_object(&oid, &object_path)?;
            if stored != content {
                return Err(JitError::corrupt(&oid, "stored bytes differ from content"));
            }
            tracing::trace!(%oid, "object already stored");
            return Ok(oid);
        }

        self.write_object(&object_path, &content)?;
        tracing::debug!(%oid, object_type = %object_type, size = raw.payload.len(), "stored object");

        Ok(oid)
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let raw = object.to_raw()?;
        self.put(raw.object_type, raw.payload)
    }

    /// Load and verify an object
    pub fn get(&self, object_id: &ObjectId) -> Result<RawObject> {
        let object_path = self.object_path(object_id);
        let content = self.read_object(object_id, &object_path)?;

        if ObjectId::from_canonical_bytes(&content) != *object_id {
            return Err(JitError::corrupt(object_id, "content does not hash to its id"));
        }

        RawObject::decode(content).map_err(|error| JitError::corrupt(object_id, error.to_string()))
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let raw = self.get(object_id)?;
        let reader = Cursor::new(raw.payload.clone());

        let object = match raw.object_type {
            ObjectType::Blob => Blob::deserialize(reader).map(|blob| ObjectBox::Blob(Box::new(blob))),
            ObjectType::Tree => Tree::deserialize(reader).map(|tree| ObjectBox::Tree(Box::new(tree))),
            ObjectType::Commit => {
                Commit::deserialize(reader).map(|commit| ObjectBox::Commit(Box::new(commit)))
            }
            ObjectType::Tag => Ok(ObjectBox::Tag(raw.payload)),
        };

        object.map_err(|error| JitError::corrupt(object_id, error.to_string()))
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        self.parse_typed(object_id, ObjectType::Blob)
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        self.parse_typed(object_id, ObjectType::Tree)
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        self.parse_typed(object_id, ObjectType::Commit)
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        Ok(self.get(object_id)?.object_type)
    }

    fn parse_typed<T: Unpackable>(&self, object_id: &ObjectId, expected: ObjectType) -> Result<T> {
        let raw = self.get(object_id)?;

        if raw.object_type != expected {
            return Err(JitError::ObjectTypeMismatch {
                oid: object_id.clone(),
                expected,
                actual: raw.object_type,
            });
        }

        T::deserialize(Cursor::new(raw.payload))
            .map_err(|error| JitError::corrupt(object_id, error.to_string()))
    }

    fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    fn read_object(&self, object_id: &ObjectId, object_path: &Path) -> Result<Bytes> {
        match std::fs::read(object_path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(JitError::ObjectNotFound(object_id.clone()))
            }
            Err(error) => Err(anyhow::Error::new(error)
                .context(format!("Unable to read object file {}", object_path.display()))
                .into()),
        }
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .with_context(|| format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).with_context(|| {
            format!("Unable to create object directory {}", object_dir.display())
        })?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .with_context(|| {
                format!("Unable to open object file {}", temp_object_path.display())
            })?;

        file.write_all(content)
            .and_then(|_| file.sync_all())
            .with_context(|| {
                format!("Unable to write object file {}", temp_object_path.display())
            })?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).with_context(|| {
            format!("Unable to rename object file to {}", object_path.display())
        })?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with the given hexadecimal prefix
    ///
    /// Used to expand abbreviated ids; more than one match means the prefix is
    /// ambiguous. Prefixes of two or more characters only scan one shard.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let mut matches = Vec::new();

        let shards = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255u8).map(|i| format!("{i:02x}")).collect()
        };

        for shard in shards {
            let dir_path = self.path.join(&shard);
            if !dir_path.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir_path)? {
                let file_name = entry?.file_name();
                let full_oid = format!("{}{}", shard, file_name.to_string_lossy());

                if full_oid.starts_with(&prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}
