use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The stored blob is not valid JSON for the expected shape.
    #[error("failed to (de)serialize cart: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored blob was written by an incompatible schema version.
    #[error("unsupported cart envelope version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The underlying medium failed (filesystem, database, ...).
    #[error("storage backend failed: {0:#}")]
    Backend(#[from] anyhow::Error),
}
