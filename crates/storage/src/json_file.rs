//! File-backed schema store: the whole collection as one JSON array.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use formwork_core::FormSchema;

use crate::error::StorageError;
use crate::traits::SchemaStore;

/// Stores every schema in a single pretty-printed JSON file. Reads
/// happen per call; writes go through a sibling temp file and a rename,
/// so the collection on disk is always either the old or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, schemas: &[FormSchema]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut body = serde_json::to_vec_pretty(schemas)?;
        body.push(b'\n');
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SchemaStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<FormSchema>, StorageError> {
        let body = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn persist(&self, schema: &FormSchema) -> Result<(), StorageError> {
        let mut schemas = self.load_all()?;
        match schemas.iter_mut().find(|s| s.id == schema.id) {
            Some(existing) => *existing = schema.clone(),
            None => schemas.push(schema.clone()),
        }
        self.write_all(&schemas)
    }

    fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        let mut schemas = self.load_all()?;
        let before = schemas.len();
        schemas.retain(|s| s.id != id);
        if schemas.len() == before {
            return Err(StorageError::SchemaNotFound { id: id.to_owned() });
        }
        self.write_all(&schemas)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
