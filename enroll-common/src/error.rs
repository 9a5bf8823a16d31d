//! Common error types for the enrollment service

use thiserror::Error;

use crate::wizard::StageKey;

/// Common result type for enrollment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the enrollment crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A later wizard stage was reached before an earlier one completed
    #[error("Missing prerequisite stage: {0}")]
    MissingPrerequisite(StageKey),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
