/// All errors that can be returned by a SchemaStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No saved schema with the requested id.
    #[error("schema not found: {id}")]
    SchemaNotFound { id: String },

    /// The backing store could not be read or written.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The store contents did not parse as a schema collection. Not
    /// silently treated as empty: overwriting would destroy whatever
    /// the file actually holds.
    #[error("corrupt schema store: {0}")]
    Corrupt(#[from] serde_json::Error),
}
