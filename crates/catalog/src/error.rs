//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while loading, validating or mutating the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// `courses.json` could not be decoded or encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Line in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had an invalid value (e.g. a rating outside 1..=5)
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g. rating for a deleted course)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// A unique key is already taken
    #[error("Duplicate {entity}: {key}")]
    Duplicate { entity: String, key: String },

    /// Lookup by id found nothing
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: u32 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CatalogError {
    pub(crate) fn not_found(entity: &str, id: u32) -> Self {
        CatalogError::NotFound {
            entity: entity.to_string(),
            id,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
