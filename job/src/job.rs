//! Top-level run: load, transform, reconcile.
//!
//! # Example
//!
//! ```rust,ignore
//! use quizdb_init::{job, JobConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = job::run_with_config(&JobConfig::default()).await?;
//!     println!("{:?} documents", report.final_count());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use crate::config::JobConfig;
use crate::error::JobResult;
use crate::loader::load;
use crate::logs::{log_info, log_success};
use crate::reconcile::{reconcile, RunReport};
use crate::store::DocumentStore;
use crate::transform::transform;

/// Load `input` and reconcile `store` with it.
///
/// The file is read before the store is touched, so an unreadable or invalid
/// file leaves the collection as it was.
pub async fn run(input: &Path, store: &mut dyn DocumentStore) -> JobResult<RunReport> {
    log_info("=== Quiz Database Initialization Job ===");

    let tree = load(input)?;
    log_success(format!("Loaded quiz data from {}", input.display()));

    log_info("--- Transforming data ---");
    let batch = transform(tree);

    let report = reconcile(store, batch).await?;
    Ok(report)
}

/// Validate `config`, open its store and [`run`].
///
/// The store session lives for the duration of this call.
pub async fn run_with_config(config: &JobConfig) -> JobResult<RunReport> {
    config.store.validate()?;
    let mut store = config.store.open().await?;
    run(&config.input.input, &mut store).await
}
