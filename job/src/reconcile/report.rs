//! Run report returned by a successful reconciliation.

use serde::Serialize;
use serde_json::Value;

use crate::logs::{log_info, log_info_indent};

/// Whether the collection had documents before the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Collection was empty.
    #[default]
    FirstInit,
    /// Collection had documents, which were replaced.
    Resync,
}

/// Outcome of a run that reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Succeeded,
    /// Index or verification problems were logged; the data is in place.
    SucceededWithWarnings,
}

/// Records stored under one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u64,
}

/// Shape of one stored document, for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub topic: String,
    pub subtopic: String,
    pub keywords: usize,
    pub style_modifiers: usize,
}

impl SampleSummary {
    /// Summarize a stored document, tolerating missing fields.
    pub fn from_document(document: &Value) -> Self {
        let text = |field: &str| {
            document
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let len = |field: &str| document.get(field).and_then(Value::as_array).map_or(0, Vec::len);

        Self {
            topic: text("topic"),
            subtopic: text("subtopic"),
            keywords: len("keywords"),
            style_modifiers: len("style_modifiers"),
        }
    }
}

/// What the Verify stage read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Verification {
    pub final_count: u64,
    /// Distinct topics in first-seen order, with their record counts.
    pub topics: Vec<TopicCount>,
    pub sample: Option<SampleSummary>,
}

/// Report of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RunReport {
    pub namespace: String,
    pub mode: RunMode,
    pub deleted_count: u64,
    pub inserted_count: u64,
    pub categories_seen: usize,
    pub subjects_seen: usize,
    /// Absent when the verification queries failed.
    pub verification: Option<Verification>,
    pub warnings: Vec<String>,
    pub status: RunStatus,
}

impl RunReport {
    /// Record count read back by Verify, if it ran.
    pub fn final_count(&self) -> Option<u64> {
        self.verification.as_ref().map(|v| v.final_count)
    }

    /// Per-topic counts read back by Verify.
    pub fn topics(&self) -> &[TopicCount] {
        self.verification
            .as_ref()
            .map(|v| v.topics.as_slice())
            .unwrap_or_default()
    }

    /// Process exit code. Warnings never fail a run.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Succeeded | RunStatus::SucceededWithWarnings => 0,
        }
    }

    pub(crate) fn warn(&mut self, message: String) {
        self.warnings.push(message);
        self.status = RunStatus::SucceededWithWarnings;
    }
}

impl Verification {
    /// Print the verification summary, with input totals when known.
    pub fn log(&self, seen: Option<(usize, usize)>) {
        log_info(format!("Total documents: {}", self.final_count));
        if let Some((categories, subjects)) = seen {
            log_info(format!("Total categories: {}", categories));
            log_info(format!("Total subjects: {}", subjects));
        }

        log_info("Categories in database:");
        for topic in &self.topics {
            log_info_indent(format!("- {}: {} subjects", topic.topic, topic.count), 1);
        }

        if let Some(sample) = &self.sample {
            log_info("Sample document:");
            log_info_indent(format!("topic: {}", sample.topic), 1);
            log_info_indent(format!("subtopic: {}", sample.subtopic), 1);
            log_info_indent(format!("keywords: {} items", sample.keywords), 1);
            log_info_indent(format!("style_modifiers: {} items", sample.style_modifiers), 1);
        }
    }
}
