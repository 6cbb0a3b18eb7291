use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::path::Path;

impl Repository {
    /// Blob id of a working directory file, stored only when `write` is set
    pub fn hash_object(&self, file: &Path, write: bool) -> Result<ObjectId> {
        let blob = Blob::new(self.workspace().read_file(file)?);

        if write {
            let _lock = self.lock()?;
            return self.database().store(&blob);
        }

        Ok(blob.object_id()?)
    }
}
