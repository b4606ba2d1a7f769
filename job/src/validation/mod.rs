//! JSON Schema validation for subject content objects.
//!
//! The schema is embedded at compile time from `schemas/subject-content.json`
//! and requires a `keywords` array. `style_modifiers` is not part
//! of the schema: it is optional and defaulted by the transformer.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use quizdb_init::{validate_subject_content, is_valid_subject_content};
//!
//! assert!(is_valid_subject_content(&json!({ "keywords": ["mass"] })));
//! assert!(validate_subject_content(&json!({ "style_modifiers": [] })).is_err());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static SUBJECT_CONTENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/subject-content.json"))
        .expect("Invalid embedded schema")
});

static SUBJECT_CONTENT_VALIDATOR: Lazy<jsonschema::Validator> = Lazy::new(|| {
    jsonschema::draft7::new(&SUBJECT_CONTENT_SCHEMA).expect("Invalid embedded schema")
});

/// Validate a subject's content object.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate_subject_content(data: &Value) -> Result<(), Vec<String>> {
    collect_errors(&SUBJECT_CONTENT_VALIDATOR, data)
}

/// Quick check of a subject's content object.
pub fn is_valid_subject_content(data: &Value) -> bool {
    SUBJECT_CONTENT_VALIDATOR.is_valid(data)
}

fn collect_errors(validator: &jsonschema::Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
