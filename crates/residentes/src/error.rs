//! Error types for residentes.
//!
//! Every failure a request can run into falls in one of four kinds (see
//! [`ErrorKind`]); the presentation adapters map kinds to responses.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The main error type for residentes operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Request Errors ===
    /// Submitted fields failed validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No resident exists with the requested id.
    #[error("resident {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: i64,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The database is reachable but does not hold the expected schema.
    #[error("database schema error: {message}")]
    DatabaseSchema {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for residentes operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client sent fields that can be corrected.
    Validation,
    /// The addressed resident does not exist.
    NotFound,
    /// The database could not serve the request.
    Storage,
    /// Anything else; always a server-side bug or misconfiguration.
    Unexpected,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a not-found error for `id`.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DatabaseOpen { .. }
            | Self::DatabaseQuery(_)
            | Self::DatabaseSchema { .. }
            | Self::DirectoryCreate { .. } => ErrorKind::Storage,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } | Self::Internal(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// Check if this error means the resident does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The field errors, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
