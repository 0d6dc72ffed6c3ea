//! Common error types for Packrat

use thiserror::Error;

/// Common result type for Packrat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Packrat service
///
/// A get on a missing id is NOT an error: those operations return
/// `Option`, and the absence is surfaced as a null result to the caller.
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

    /// Caller has no authenticated identity
    #[error("User must be authenticated")]
    Unauthenticated,

    /// Category name collision on create
    #[error("Category with this name already exists: {0}")]
    DuplicateName(String),

    /// Referenced record does not exist at write time
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item deletion blocked by kit membership; names every offending kit
    #[error("Cannot delete item. It is part of the following kit(s): {}. Please remove it from these kits first.", .kits.join(", "))]
    InUse { kits: Vec<String> },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
