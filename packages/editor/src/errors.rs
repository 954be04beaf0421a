//! Error types for the editor

use thiserror::Error;

/// Errors raised while applying an operation step
///
/// Stale component references are not errors: steps addressing a component
/// that no longer exists are skipped so histories can be replayed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Unknown component class: {0}")]
    UnknownComponentClass(String),

    #[error("Component already exists: {0}")]
    DuplicateComponent(String),

    #[error("Duplicate section: {0}")]
    DuplicateSection(String),

    #[error("Invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid document model: {0}")]
    InvalidModel(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}
