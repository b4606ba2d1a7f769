//! Flatten the categories tree into records.
//!
//! ```text
//! { "Science": {                          { topic: "Science",
//!     "Physics": {                          subtopic: "Physics",
//!       "keywords": [...],        →         keywords: [...],
//!       "style_modifiers": [...]            style_modifiers: [...],
//!     } } }                                 created_at, updated_at }
//! ```
//!
//! A subject whose content has no `keywords` array is skipped without
//! failing the run. Whether the run as a whole produced anything is checked
//! later with [`Batch::ensure_non_empty`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::logs::{log_info, log_info_indent, log_warning};
use crate::models::{json_type_name, Batch, RawContent, RawTree, Record, SubjectMap};
use crate::validation::validate_subject_content;

/// Result of flattening a tree
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Accepted records and counts
    pub batch: Batch,
    /// Subjects (or whole categories) that produced no record
    pub skipped: Vec<SkippedSubject>,
}

/// An entry that was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSubject {
    pub category: String,
    /// `None` when the whole category was malformed
    pub subject: Option<String>,
    pub reasons: Vec<String>,
}

impl TransformOutcome {
    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Transformed: {} records from {} categories / {} subjects, {} skipped",
            self.batch.len(),
            self.batch.categories_seen,
            self.batch.subjects_seen,
            self.skipped.len()
        )
    }
}

/// Flatten `tree` into records stamped with the current time.
pub fn transform(tree: RawTree) -> Batch {
    transform_at(tree, Utc::now())
}

/// Flatten `tree` into records stamped with `now`.
pub fn transform_at(tree: RawTree, now: DateTime<Utc>) -> Batch {
    transform_detailed(tree, now).batch
}

/// Flatten `tree`, also reporting what was skipped and why.
pub fn transform_detailed(tree: RawTree, now: DateTime<Utc>) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();
    outcome.batch.categories_seen = tree.category_count();
    outcome.batch.subjects_seen = tree.subject_count();

    for category in tree.categories {
        log_info(format!("Category: {}", category.name));

        let subjects = match category.subjects {
            SubjectMap::Subjects(subjects) => subjects,
            SubjectMap::Malformed(value) => {
                let reason = format!(
                    "expected an object of subjects, found {}",
                    json_type_name(&value)
                );
                log_warning(format!("Category {}: {}, skipped", category.name, reason));
                outcome.skipped.push(SkippedSubject {
                    category: category.name,
                    subject: None,
                    reasons: vec![reason],
                });
                continue;
            }
        };

        for subject in subjects {
            match build_record(&category.name, &subject.name, &subject.content, now) {
                Ok(record) => {
                    log_info_indent(
                        format!(
                            "- {}: {} keywords, {} style_modifiers",
                            record.subtopic,
                            record.keywords.len(),
                            record.style_modifiers.len()
                        ),
                        1,
                    );
                    outcome.batch.records.push(record);
                }
                Err(reasons) => outcome.skipped.push(SkippedSubject {
                    category: category.name.clone(),
                    subject: Some(subject.name),
                    reasons,
                }),
            }
        }
    }

    outcome
}

/// Build one record, or return the validation errors that rule it out.
fn build_record(
    topic: &str,
    subtopic: &str,
    content: &RawContent,
    now: DateTime<Utc>,
) -> Result<Record, Vec<String>> {
    let map = match content {
        RawContent::Object(map) => map,
        RawContent::Malformed(value) => {
            return Err(vec![format!(
                "content must be an object, found {}",
                json_type_name(value)
            )])
        }
    };

    validate_subject_content(&content.as_value())?;

    let keywords = match map.get("keywords") {
        Some(Value::Array(items)) => items.clone(),
        _ => return Err(vec!["keywords must be an array".to_string()]),
    };
    let style_modifiers = style_modifiers(topic, subtopic, map);

    Ok(Record::new(topic, subtopic, keywords, style_modifiers, now))
}

/// `style_modifiers`, or an empty list when absent or falsy.
///
/// A truthy value that is not a list of strings cannot be stored either, so
/// it also becomes an empty list, with a warning.
fn style_modifiers(topic: &str, subtopic: &str, content: &Map<String, Value>) -> Vec<String> {
    let value = match content.get("style_modifiers") {
        None => return Vec::new(),
        Some(value) if is_falsy(value) => return Vec::new(),
        Some(value) => value,
    };

    string_array(Some(value)).unwrap_or_else(|| {
        log_warning(format!(
            "{} / {}: style_modifiers is not a list of strings ({}), using []",
            topic,
            subtopic,
            json_type_name(value)
        ));
        Vec::new()
    })
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

/// JSON values that count as "not provided".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_tree;
    use serde_json::json;
    use std::path::Path;

    fn tree(value: Value) -> RawTree {
        parse_tree(&value.to_string(), Path::new("db.json")).unwrap()
    }

    #[test]
    fn test_reference_example() {
        let now = Utc::now();
        let batch = transform_at(
            tree(json!({
                "Science": {
                    "Physics": { "keywords": ["mass", "force"], "style_modifiers": ["formal"] },
                    "Biology": { "keywords": [] }
                }
            })),
            now,
        );

        assert_eq!(
            batch.records,
            vec![
                Record::new(
                    "Science",
                    "Physics",
                    vec!["mass".into(), "force".into()],
                    vec!["formal".into()],
                    now
                ),
                Record::new("Science", "Biology", vec![], vec![], now),
            ]
        );
        assert_eq!(batch.categories_seen, 1);
        assert_eq!(batch.subjects_seen, 2);
    }

    #[test]
    fn test_traversal_order() {
        let batch = transform(tree(json!({
            "B": { "b2": { "keywords": [] }, "b1": { "keywords": [] } },
            "A": { "a1": { "keywords": [] } }
        })));

        let keys: Vec<_> = batch.records.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec![("B", "b2"), ("B", "b1"), ("A", "a1")]);
    }

    #[test]
    fn test_invalid_keywords_are_skipped() {
        let outcome = transform_detailed(
            tree(json!({
                "Science": {
                    "Missing": { "style_modifiers": ["formal"] },
                    "Text": { "keywords": "mass" },
                    "Null": { "keywords": null },
                    "Scalar": 7,
                    "Ok": { "keywords": ["cell"] }
                }
            })),
            Utc::now(),
        );

        assert_eq!(outcome.batch.len(), 1);
        assert_eq!(outcome.batch.records[0].subtopic, "Ok");
        assert_eq!(outcome.batch.subjects_seen, 5);

        let skipped: Vec<_> = outcome
            .skipped
            .iter()
            .map(|s| s.subject.as_deref().unwrap())
            .collect();
        assert_eq!(skipped, vec!["Missing", "Text", "Null", "Scalar"]);
        assert!(outcome.skipped.iter().all(|s| !s.reasons.is_empty()));
    }

    #[test]
    fn test_mixed_keywords_kept_as_is() {
        let batch = transform(tree(json!({
            "Science": { "Physics": { "keywords": ["mass", 1, null, { "unit": "kg" }] } }
        })));

        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.records[0].keywords,
            vec![json!("mass"), json!(1), Value::Null, json!({ "unit": "kg" })]
        );
    }

    #[test]
    fn test_malformed_category_is_skipped() {
        let outcome = transform_detailed(
            tree(json!({
                "Broken": ["Physics"],
                "Science": { "Physics": { "keywords": ["mass"] } }
            })),
            Utc::now(),
        );

        assert_eq!(outcome.batch.len(), 1);
        assert_eq!(outcome.batch.categories_seen, 2);
        assert_eq!(outcome.skipped[0].category, "Broken");
        assert_eq!(outcome.skipped[0].subject, None);
    }

    #[test]
    fn test_style_modifiers_default() {
        let batch = transform(tree(json!({
            "T": {
                "absent": { "keywords": ["k"] },
                "null": { "keywords": ["k"], "style_modifiers": null },
                "false": { "keywords": ["k"], "style_modifiers": false },
                "zero": { "keywords": ["k"], "style_modifiers": 0 },
                "blank": { "keywords": ["k"], "style_modifiers": "" },
                "word": { "keywords": ["k"], "style_modifiers": "formal" },
                "mixed": { "keywords": ["k"], "style_modifiers": ["formal", 2] },
                "set": { "keywords": ["k"], "style_modifiers": ["casual"] }
            }
        })));

        assert_eq!(batch.len(), 8);
        for record in &batch.records[..7] {
            assert!(record.style_modifiers.is_empty(), "{}", record.subtopic);
        }
        assert_eq!(batch.records[7].style_modifiers, vec!["casual".to_string()]);
    }

    #[test]
    fn test_timestamps_match() {
        let batch = transform(tree(json!({ "T": { "S": { "keywords": ["k"] } } })));
        let record = &batch.records[0];
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_nothing_accepted() {
        let outcome = transform_detailed(
            tree(json!({ "T": { "S": { "style_modifiers": ["formal"] } } })),
            Utc::now(),
        );
        assert!(outcome.batch.is_empty());
        assert!(outcome.batch.ensure_non_empty().is_err());
        assert!(outcome.summary().contains("1 skipped"));
    }

    #[test]
    fn test_falsy() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(0.0)));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
        assert!(!is_falsy(&json!("x")));
    }
}
