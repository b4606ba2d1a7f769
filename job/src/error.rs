//! Error types for the quiz data initialization job.
//!
//! One enum per layer, converted with `From` so `?` works across the
//! boundaries:
//!
//! - [`LoadError`] - reading and parsing the categories file
//! - [`TransformError`] - building records from the parsed tree
//! - [`StoreError`] - document store operations
//! - [`ReconcileError`] - fatal failures while reconciling the collection
//! - [`ConfigError`] - invalid job configuration
//! - [`JobError`] - top-level run errors
//!
//! Index build failures have no type here: they are collected as warnings in
//! the run report.
//!
//! Messages do not name the failing stage; callers print it from
//! [`JobError::stage`].

use std::path::PathBuf;
use thiserror::Error;

use crate::reconcile::Stage;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading the categories file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File missing, unreadable, or not UTF-8.
    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid JSON.
    #[error("Could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but the top level is not a category object.
    #[error("Could not parse {}: expected an object of categories, found {found}", .path.display())]
    NotAnObject { path: PathBuf, found: String },
}

impl LoadError {
    /// True for the malformed-content kinds (as opposed to I/O).
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, LoadError::Io { .. })
    }
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors while building records.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Not a single subject carried a valid keywords list.
    #[error("No documents to insert: no subject in {categories} categories has a keywords list")]
    EmptyResult { categories: usize },
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Collection file could not be read or written.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document (de)serialization failed.
    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Collection file exists but does not hold a collection.
    #[error("Corrupt collection file {}: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    /// The store refused the operation.
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn rejected(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            operation,
            message: message.into(),
        }
    }
}

// =============================================================================
// Reconcile Errors
// =============================================================================

/// Fatal failures of the reconciliation state machine.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A store operation failed in a fatal stage.
    #[error("{source}")]
    Store {
        stage: Stage,
        #[source]
        source: StoreError,
    },

    /// The batch was empty; the collection has been cleared and left empty.
    #[error("{0}")]
    EmptyResult(#[from] TransformError),

    /// The store acknowledged fewer documents than it was given.
    #[error("expected {expected} inserted ids, store returned {inserted}")]
    InsertMismatch { expected: usize, inserted: usize },
}

impl ReconcileError {
    /// Stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            ReconcileError::Store { stage, .. } => *stage,
            ReconcileError::EmptyResult(_) | ReconcileError::InsertMismatch { .. } => Stage::Insert,
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Invalid job configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Name is empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Name would escape the data directory.
    #[error("{field} '{value}' must not contain path separators or '..'")]
    InvalidName { field: &'static str, value: String },
}

// =============================================================================
// Job Errors (top-level)
// =============================================================================

/// Top-level run errors.
///
/// This is the error type returned by [`crate::job::run`].
#[derive(Debug, Error)]
pub enum JobError {
    /// Invalid configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Store could not be opened.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Categories file could not be loaded.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Reconciliation failed.
    #[error("{0}")]
    Reconcile(#[from] ReconcileError),
}

impl JobError {
    /// Short name of the failing stage, used in `ERROR:` diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            JobError::Config(_) => "config",
            JobError::Store(_) => "open",
            JobError::Load(_) => "load",
            JobError::Reconcile(e) => e.stage().name(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Result type for a whole run.
pub type JobResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TransformError -> ReconcileError -> JobError
        let empty = TransformError::EmptyResult { categories: 3 };
        let reconcile_err: ReconcileError = empty.into();
        assert_eq!(reconcile_err.stage(), Stage::Insert);

        let job_err: JobError = reconcile_err.into();
        assert_eq!(job_err.stage(), "insert");
        assert!(job_err.to_string().contains("No documents to insert"));
    }

    #[test]
    fn test_messages_leave_stage_to_caller() {
        let err = ReconcileError::Store {
            stage: Stage::Clear,
            source: StoreError::rejected("deleteMany", "not primary"),
        };
        assert_eq!(err.stage(), Stage::Clear);
        assert_eq!(err.to_string(), "deleteMany rejected: not primary");

        let job_err: JobError = err.into();
        assert_eq!(job_err.stage(), "clear");
        assert_eq!(job_err.to_string(), "deleteMany rejected: not primary");
    }

    #[test]
    fn test_load_error_kinds() {
        let io = LoadError::Io {
            path: PathBuf::from("/init-data/db.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!io.is_parse_error());
        assert!(io.to_string().contains("/init-data/db.json"));

        let shape = LoadError::NotAnObject {
            path: PathBuf::from("db.json"),
            found: "array".into(),
        };
        assert!(shape.is_parse_error());
        let job_err: JobError = shape.into();
        assert_eq!(job_err.stage(), "load");
        assert!(job_err.to_string().starts_with("Could not parse db.json"));
    }
}
