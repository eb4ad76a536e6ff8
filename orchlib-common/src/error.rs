//! Common error types for the orchestra library

use std::fmt;
use thiserror::Error;

/// Common result type for library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of entity protected by the bulk-delete guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Musician,
    Score,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Musician => write!(f, "musician"),
            EntityKind::Score => write!(f, "score"),
        }
    }
}

/// Common error types across orchlib crates
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

    /// Missing or malformed user input (e.g. no musician selected)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not allowed in the current state (e.g. returning a returned loan)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Delete blocked by active loans; `blocking` holds display names
    #[error("Cannot delete: {} {entity}(s) still have active loans: {}", blocking.len(), blocking.join(", "))]
    GuardViolation {
        entity: EntityKind,
        blocking: Vec<String>,
    },

    /// Notification could not be delivered
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Caller is not signed in
    #[error("Caller must be authenticated")]
    Unauthenticated,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors that carry a message meant for the librarian
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::GuardViolation { .. } | Error::InvalidState(_) | Error::NotFound(_)
        )
    }
}
