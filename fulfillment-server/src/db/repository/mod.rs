//! Repository Module
//!
//! Data access functions over the SQLite pool. Repositories are plain
//! async functions; multi-statement workflows (status transitions,
//! token redemption, return submission) own their transactions in the
//! domain modules instead.

// Orders
pub mod order;

// Digital downloads
pub mod download;

// Returns
pub mod return_request;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
