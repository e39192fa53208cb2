/// All errors that can be returned by a ScriptStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record with the given id.
    #[error("script not found: {id}")]
    NotFound { id: String },

    /// Reading or writing the backing file failed.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing data could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend-specific storage error (connection, constraint, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
