//! Reconcile the collection with a freshly transformed batch.
//!
//! The run is a linear state machine:
//!
//! ```text
//! Inspect ──(count > 0)──▶ Clear ──▶ Insert ──▶ Index ──▶ Verify ──▶ Done
//!    └──────(count == 0)────────────▲
//! ```
//!
//! Inspect, Clear and Insert are fatal on error. Index failures become
//! warnings in the [`RunReport`]; Verify only observes. Nothing is retried:
//! re-running the whole job is the orchestrator's decision, and it is safe
//! because every run replaces the collection wholesale.
//!
//! No lock is taken. Two runs racing on the same collection can interleave
//! their Clear and Insert stages; callers must not run the job concurrently.

pub mod report;

use serde_json::Value;
use std::fmt;

use crate::error::{ReconcileError, ReconcileResult, StoreError, StoreResult};
use crate::logs::{log_info, log_success, log_warning};
use crate::models::Batch;
use crate::store::{DocumentStore, Filter, IndexSpec};

pub use report::{RunMode, RunReport, RunStatus, SampleSummary, TopicCount, Verification};

/// Secondary indexes rebuilt on every run.
pub const INDEXES: [&[&str]; 3] = [&["topic"], &["subtopic"], &["topic", "subtopic"]];

/// States of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Inspect,
    Clear,
    Insert,
    Index,
    Verify,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Inspect => "inspect",
            Stage::Clear => "clear",
            Stage::Insert => "insert",
            Stage::Index => "index",
            Stage::Verify => "verify",
            Stage::Done => "done",
        }
    }

    /// Whether an error in this stage aborts the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Stage::Inspect | Stage::Clear | Stage::Insert)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn fatal(stage: Stage) -> impl FnOnce(StoreError) -> ReconcileError {
    move |source| ReconcileError::Store { stage, source }
}

/// Replace the contents of `store` with `batch`.
///
/// An empty batch fails at Insert, after Clear: the collection is left empty
/// rather than holding stale data.
pub async fn reconcile(store: &mut dyn DocumentStore, mut batch: Batch) -> ReconcileResult<RunReport> {
    let mut report = RunReport {
        namespace: store.namespace(),
        categories_seen: batch.categories_seen,
        subjects_seen: batch.subjects_seen,
        ..RunReport::default()
    };

    let mut stage = Stage::Inspect;
    loop {
        stage = match stage {
            Stage::Inspect => {
                log_info(format!("Checking {}...", report.namespace));
                let existing = store.count(None).await.map_err(fatal(Stage::Inspect))?;

                if existing > 0 {
                    log_info(format!("Found {} existing documents", existing));
                    log_info("Recreating collection from the categories file to sync latest changes...");
                    report.mode = RunMode::Resync;
                    Stage::Clear
                } else {
                    log_info("Collection is empty. Starting initialization...");
                    report.mode = RunMode::FirstInit;
                    Stage::Insert
                }
            }

            Stage::Clear => {
                log_info("Deleting existing data...");
                let deleted = store.delete_all().await.map_err(fatal(Stage::Clear))?;
                log_success(format!("Deleted {} documents", deleted.deleted_count));
                report.deleted_count = deleted.deleted_count;
                Stage::Insert
            }

            Stage::Insert => {
                log_info(format!("--- Inserting {} documents ---", batch.len()));
                batch.ensure_non_empty()?;
                let records = std::mem::take(&mut batch.records);

                let expected = records.len();
                let documents = records
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<Value>, _>>()
                    .map_err(|e| fatal(Stage::Insert)(StoreError::Json(e)))?;

                let result = store.insert_many(documents).await.map_err(fatal(Stage::Insert))?;
                let inserted = result.inserted_ids.len();
                if inserted != expected {
                    return Err(ReconcileError::InsertMismatch { expected, inserted });
                }

                log_success(format!("Successfully inserted {} documents", inserted));
                report.inserted_count = inserted as u64;
                Stage::Index
            }

            Stage::Index => {
                log_info("--- Creating indexes ---");
                for warning in build_indexes(store).await {
                    log_warning(&warning);
                    report.warn(warning);
                }
                if report.warnings.is_empty() {
                    log_success("Indexes created successfully");
                }
                Stage::Verify
            }

            Stage::Verify => {
                log_info("=== Verification ===");
                match verify(store).await {
                    Ok(verification) => {
                        verification.log(Some((report.categories_seen, report.subjects_seen)));
                        report.verification = Some(verification);
                    }
                    Err(e) => {
                        let warning = format!("Verification failed: {}", e);
                        log_warning(&warning);
                        report.warn(warning);
                    }
                }
                Stage::Done
            }

            Stage::Done => {
                log_success("=== Database Initialization Complete! ===");
                return Ok(report);
            }
        };
    }
}

/// Create every index in [`INDEXES`], returning one warning per failure.
async fn build_indexes(store: &mut dyn DocumentStore) -> Vec<String> {
    let mut warnings = Vec::new();
    for fields in INDEXES {
        let spec = IndexSpec::ascending(fields);
        if let Err(e) = store.create_index(&spec).await {
            warnings.push(format!("Failed to create index {}: {}", spec.name(), e));
        }
    }
    warnings
}

/// Read back count, per-topic counts and one sample document.
pub async fn verify(store: &dyn DocumentStore) -> StoreResult<Verification> {
    let final_count = store.count(None).await?;

    let mut topics = Vec::new();
    for value in store.distinct("topic").await? {
        let Some(topic) = value.as_str() else {
            continue;
        };
        let count = store.count(Some(&Filter::field_eq("topic", topic))).await?;
        topics.push(TopicCount {
            topic: topic.to_string(),
            count,
        });
    }

    let sample = store.find_one().await?.map(|doc| SampleSummary::from_document(&doc));

    Ok(Verification {
        final_count,
        topics,
        sample,
    })
}
