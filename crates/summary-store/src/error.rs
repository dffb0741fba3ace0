//! Error types for the summary store.

use summary_models::AdapterError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("no summary exists for video path")]
    NotFound,

    #[error("a summary already exists and is completed")]
    AlreadyExists,

    #[error("a task is already in progress for this video")]
    AlreadyInProgress,
}

impl From<StoreError> for AdapterError {
    fn from(err: StoreError) -> Self {
        AdapterError::internal(err.to_string())
    }
}
