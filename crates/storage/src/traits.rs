use formwork_core::FormSchema;

use crate::error::StorageError;

/// The storage trait for saved form schemas.
///
/// A `SchemaStore` holds one flat collection of [`FormSchema`] records.
/// Schemas are immutable once saved: `persist` either appends a new
/// record or replaces the record with the same id wholesale, and the
/// only other mutation is full deletion by id.
///
/// ## Consistency
///
/// Implementations read and write the whole collection per call. The
/// engine is single-threaded and synchronous, so there is no
/// transaction surface; a store that writes a file must still replace
/// it atomically so a crash mid-write never leaves a half-written
/// collection behind.
pub trait SchemaStore {
    /// Load every saved schema, in stored order.
    ///
    /// An empty or never-written store loads as an empty collection,
    /// not an error.
    fn load_all(&self) -> Result<Vec<FormSchema>, StorageError>;

    /// Save a schema. Replaces any existing record with the same id.
    fn persist(&self, schema: &FormSchema) -> Result<(), StorageError>;

    /// Delete the schema with the given id.
    ///
    /// Returns `Err(StorageError::SchemaNotFound)` when no record
    /// matches.
    fn delete_by_id(&self, id: &str) -> Result<(), StorageError>;

    /// Load one schema by id.
    ///
    /// Returns `Err(StorageError::SchemaNotFound)` when no record
    /// matches.
    fn find_by_id(&self, id: &str) -> Result<FormSchema, StorageError> {
        self.load_all()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StorageError::SchemaNotFound { id: id.to_owned() })
    }
}
