//! Error handling module for the clean room assistant
//!
//! Provides the library error type using thiserror. Application glue
//! (`main`, request files, output writing) wraps these in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for plan resolution, rendering and execution
#[derive(Error, Debug)]
pub enum DcrError {
    /// IO errors (template reads, output writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors (caller input rejected before the core runs)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A template referenced by the plan does not exist
    #[error("Template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    /// The execution collaborator rejected a batch
    #[error("Execution of {script} failed: {message}")]
    Execution { script: String, message: String },

    /// A step is bound to a connection the request did not name
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type alias for clean room operations
pub type Result<T> = std::result::Result<T, DcrError>;

impl DcrError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an execution error for a script
    pub fn execution(script: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Execution {
            script: script.into(),
            message: msg.into(),
        }
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}
