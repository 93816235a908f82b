//! Error types for diffing and document handling.
//!
//! Parse-level anomalies in snapshot text never surface here: the patch
//! parser degrades malformed lines into a diagnostic collection on the
//! [`Snapshot`](crate::patch::Snapshot) instead of failing. Errors in this
//! module cover I/O, structurally broken diff documents, and invalid
//! configuration values.

use std::io;
use thiserror::Error;

/// Result type alias for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Errors that can occur while building, serializing, or reading diff
/// documents.
#[derive(Error, Debug)]
pub enum DiffError {
    /// I/O error occurred while reading a snapshot or document file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The serialized document text is not a well-formed element tree.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A required structural path is absent from a serialized document.
    #[error("Missing required element: {path}")]
    MissingElement {
        /// Slash-separated path of the missing element, e.g. `baseline/file/name`.
        path: String,
    },

    /// Unrecognized action code (must be one of I, D, E, O).
    #[error("Invalid action code: {0:?} (expected one of I, D, E, O)")]
    InvalidAction(String),
}

impl DiffError {
    /// Creates a malformed-document error with detailed context.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }

    /// Creates a missing-element error for a required structural path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_differ::error::DiffError;
    /// let err = DiffError::missing_element("delta/app/action");
    /// ```
    pub fn missing_element(path: impl Into<String>) -> Self {
        Self::MissingElement { path: path.into() }
    }
}
