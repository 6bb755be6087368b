//! In-memory schema store, for tests and ephemeral sessions.

use std::sync::{Mutex, PoisonError};

use formwork_core::FormSchema;

use crate::error::StorageError;
use crate::traits::SchemaStore;

/// Keeps the collection in a `Mutex<Vec<_>>`. Same observable behavior
/// as the file store, minus the disk.
#[derive(Debug)]
pub struct MemoryStore {
    schemas: Mutex<Vec<FormSchema>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            schemas: Mutex::new(Vec::new()),
        }
    }

    fn with_schemas<T>(&self, f: impl FnOnce(&mut Vec<FormSchema>) -> T) -> T {
        // a poisoned lock still holds valid data; recover it
        let mut guard = self
            .schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<FormSchema>, StorageError> {
        Ok(self.with_schemas(|schemas| schemas.clone()))
    }

    fn persist(&self, schema: &FormSchema) -> Result<(), StorageError> {
        self.with_schemas(|schemas| {
            match schemas.iter_mut().find(|s| s.id == schema.id) {
                Some(existing) => *existing = schema.clone(),
                None => schemas.push(schema.clone()),
            }
        });
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        let removed = self.with_schemas(|schemas| {
            let before = schemas.len();
            schemas.retain(|s| s.id != id);
            schemas.len() != before
        });
        if removed {
            Ok(())
        } else {
            Err(StorageError::SchemaNotFound { id: id.to_owned() })
        }
    }
}
