use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::commands::plumbing::resolve_object;
use crate::errors::Result;

impl Repository {
    /// Decode the object an id, id prefix or revision designates
    pub fn cat_file(&self, object: &str) -> Result<ObjectBox> {
        let oid = resolve_object(self, object)?;
        self.database().parse_object(&oid)
    }
}
