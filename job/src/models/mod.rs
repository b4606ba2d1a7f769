//! Domain models for the quiz data job.
//!
//! - [`RawTree`] - the categories file as parsed, before any validation
//! - [`Record`] - one flat topic/subtopic document
//! - [`StoredRecord`] - a record read back from the store, with its `_id`
//! - [`Batch`] - the ordered records produced by one transform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TransformError;

// =============================================================================
// Raw Tree
// =============================================================================

/// Parsed categories file: category -> subject -> content.
///
/// Only the top level is guaranteed to be an object. Anything below may be
/// malformed and is kept as-is so the transformer can decide to skip it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTree {
    /// Categories in file order.
    pub categories: Vec<RawCategory>,
}

/// One category and its subject map.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCategory {
    pub name: String,
    pub subjects: SubjectMap,
}

/// The value under a category key.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectMap {
    /// An object of subjects, in file order.
    Subjects(Vec<RawSubject>),
    /// Anything that is not an object.
    Malformed(Value),
}

/// One subject and its content object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSubject {
    pub name: String,
    pub content: RawContent,
}

/// The value under a subject key.
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// A JSON object; its fields are validated by the transformer.
    Object(Map<String, Value>),
    /// Anything that is not an object.
    Malformed(Value),
}

impl RawTree {
    /// Classify a top-level category object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let categories = map
            .into_iter()
            .map(|(name, value)| RawCategory {
                name,
                subjects: SubjectMap::from_value(value),
            })
            .collect();

        Self { categories }
    }

    /// Number of categories, malformed ones included.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of subjects across all well-formed categories.
    pub fn subject_count(&self) -> usize {
        self.categories
            .iter()
            .map(|c| match &c.subjects {
                SubjectMap::Subjects(subjects) => subjects.len(),
                SubjectMap::Malformed(_) => 0,
            })
            .sum()
    }
}

impl SubjectMap {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => SubjectMap::Subjects(
                map.into_iter()
                    .map(|(name, content)| RawSubject {
                        name,
                        content: RawContent::from_value(content),
                    })
                    .collect(),
            ),
            other => SubjectMap::Malformed(other),
        }
    }
}

impl RawContent {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawContent::Object(map),
            other => RawContent::Malformed(other),
        }
    }

    /// The content as a JSON value, for schema validation.
    pub fn as_value(&self) -> Value {
        match self {
            RawContent::Object(map) => Value::Object(map.clone()),
            RawContent::Malformed(value) => value.clone(),
        }
    }
}

/// JSON type name of a value, for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Records
// =============================================================================

/// One quiz subject, flattened for storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Category name.
    pub topic: String,
    /// Subject name.
    pub subtopic: String,
    /// Copied from the source as-is; elements are not type-checked.
    pub keywords: Vec<Value>,
    /// Empty when the source had none.
    #[serde(default)]
    pub style_modifiers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Build a record stamped with `now` for both timestamps.
    pub fn new(
        topic: impl Into<String>,
        subtopic: impl Into<String>,
        keywords: Vec<Value>,
        style_modifiers: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            topic: topic.into(),
            subtopic: subtopic.into(),
            keywords,
            style_modifiers,
            created_at: now,
            updated_at: now,
        }
    }

    /// The `(topic, subtopic)` identity of the record.
    pub fn key(&self) -> (&str, &str) {
        (&self.topic, &self.subtopic)
    }
}

/// A record as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: Record,
}

// =============================================================================
// Batch
// =============================================================================

/// Output of one transform: accepted records plus what was seen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// Accepted records in traversal order.
    pub records: Vec<Record>,
    /// Categories in the input, malformed ones included.
    pub categories_seen: usize,
    /// Subjects in the input, skipped ones included.
    pub subjects_seen: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail when no subject produced a record.
    pub fn ensure_non_empty(&self) -> Result<(), TransformError> {
        if self.records.is_empty() {
            Err(TransformError::EmptyResult {
                categories: self.categories_seen,
            })
        } else {
            Ok(())
        }
    }
}
