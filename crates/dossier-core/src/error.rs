//! Error types for dossier.

use thiserror::Error;

/// Result type alias using dossier's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// Request field the failure refers to (e.g. `"query"`, `"limit"`).
    pub field: String,
    /// Human-readable description of the constraint that was violated.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collection of field-level validation failures for one request.
///
/// Validation runs to completion before reporting, so a single response
/// carries every violated constraint rather than the first one found.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// True when no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into `Ok(())` or `Err(Error::Validation)`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Core error type for dossier operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document not found, not active, or not indexed
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Request failed field-level validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Search operation failed
    #[error("Search error: {0}")]
    Search(String),

    /// Index build/rebuild failed
    #[error("Index error: {0}")]
    Index(String),

    /// Analytics recording or aggregation failed
    #[error("Analytics error: {0}")]
    Analytics(String),

    /// Operation conflicts with one already in progress
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
