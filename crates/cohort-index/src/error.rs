//! Error type for the predicate-count store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Schema(#[from] cohort_types::SchemaError),
}
