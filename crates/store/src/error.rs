use thiserror::Error;

use jsfashion_storage::StorageError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
