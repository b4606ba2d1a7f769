//! # quizdb-init - Quiz data initialization job
//!
//! Loads the quiz categories file and makes the `quiz_data` collection mirror
//! it exactly. Safe to run any number of times: every run replaces the
//! collection wholesale.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   db.json   │────▶│   Loader    │────▶│  Transform  │────▶│  Reconcile  │
//! │ (category → │     │  (RawTree)  │     │  (Records)  │     │ clear+insert│
//! │  subject)   │     │             │     │             │     │ index+verify│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quizdb_init::{job, MemoryStore};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut store = MemoryStore::default();
//!     let report = job::run(Path::new("db.json"), &mut store).await.unwrap();
//!     println!("{:?} documents", report.final_count());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Raw tree, records, batches
//! - [`loader`] - Categories file loading
//! - [`validation`] - Subject content schema
//! - [`transform`] - Tree to records
//! - [`store`] - Document store interface and implementations
//! - [`reconcile`] - Clear, insert, index, verify
//! - [`job`] - Full run
//! - [`config`] - Flags and environment
//! - [`logs`] - Operator log stream

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod loader;

// Transformation
pub mod transform;
pub mod validation;

// Storage
pub mod reconcile;
pub mod store;

// Orchestration
pub mod config;
pub mod job;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, JobError, LoadError, ReconcileError, StoreError, TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Batch, RawCategory, RawContent, RawSubject, RawTree, Record, StoredRecord, SubjectMap};

// =============================================================================
// Re-exports - Loading and transformation
// =============================================================================

pub use loader::{load, parse_tree};
pub use transform::{transform, transform_at, transform_detailed, SkippedSubject, TransformOutcome};
pub use validation::{is_valid_subject_content, validate_subject_content};

// =============================================================================
// Re-exports - Store and reconciliation
// =============================================================================

pub use reconcile::{reconcile, RunMode, RunReport, RunStatus, Stage, TopicCount};
pub use store::{DocumentStore, Filter, IndexSpec, JsonFileStore, MemoryStore};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{InputConfig, JobConfig, StoreConfig};
