//! Error types for Folio core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while higher-level code can use `anyhow` for
//! convenient error handling.
//!
//! Absent record data is never an error: a missing field simply does not
//! match a filter and sorts last. Errors are reserved for structurally
//! invalid input supplied by the caller.

use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Core error types for Folio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    // === Query Configuration Errors ===
    /// A field path is empty or cannot be parsed
    #[error("invalid field path {path:?}: {reason}")]
    InvalidFieldPath { path: String, reason: String },

    /// A sort direction other than ascending or descending
    #[error("unknown sort direction {direction:?} (expected \"asc\" or \"desc\")")]
    UnknownSortDirection { direction: String },

    /// A content source that is not a JSON array of records
    #[error("expected an array of records, found {found}")]
    NotACollection { found: String },

    /// A section name that is not present in the configuration
    #[error("unknown section: {name}")]
    UnknownSection { name: String },

    // === Configuration File Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON content could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FolioError {
    /// Returns true if this error was caused by a malformed query or section
    /// configuration (a caller bug rather than an environment failure).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FolioError::InvalidFieldPath { .. }
                | FolioError::UnknownSortDirection { .. }
                | FolioError::NotACollection { .. }
                | FolioError::UnknownSection { .. }
                | FolioError::ConfigError { .. }
        )
    }

    /// Create an invalid field path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FolioError::InvalidFieldPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        FolioError::ConfigError {
            reason: reason.into(),
        }
    }
}
