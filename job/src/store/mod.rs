//! Document store interface.
//!
//! The job only needs a handful of collection operations, modelled on what a
//! document database exposes:
//!
//! | Operation       | Returns                 |
//! |-----------------|-------------------------|
//! | `count`         | number of documents     |
//! | `delete_all`    | [`DeleteResult`]        |
//! | `insert_many`   | [`InsertManyResult`]    |
//! | `create_index`  | index name              |
//! | `distinct`      | distinct field values   |
//! | `find_one`      | any one document        |
//!
//! Two implementations share the [`Collection`] logic:
//! - [`MemoryStore`] - in-process, nothing persisted
//! - [`JsonFileStore`] - one JSON file per collection, rewritten on each write

pub mod file;
pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Field holding the document id.
pub const ID_FIELD: &str = "_id";

/// A collection in a document store.
///
/// Sessions are passed explicitly; there is no global handle.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable location, e.g. `quizdb.quiz_data`.
    fn namespace(&self) -> String;

    /// Count documents, optionally restricted by `filter`.
    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64>;

    /// Delete every document.
    async fn delete_all(&mut self) -> StoreResult<DeleteResult>;

    /// Insert all documents or none. Each one gets a fresh `_id`.
    async fn insert_many(&mut self, documents: Vec<Value>) -> StoreResult<InsertManyResult>;

    /// Create an index, returning its name. Existing indexes are kept.
    async fn create_index(&mut self, spec: &IndexSpec) -> StoreResult<String>;

    /// Distinct values of `field`, in first-seen order.
    async fn distinct(&self, field: &str) -> StoreResult<Vec<Value>>;

    /// Any one document.
    async fn find_one(&self) -> StoreResult<Option<Value>>;
}

// =============================================================================
// Operation Types
// =============================================================================

/// Equality match on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<String>,
}

/// One key of an index: field and direction (`1` or `-1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    pub field: String,
    pub direction: i8,
}

/// Ordered index keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub keys: Vec<IndexKey>,
}

impl IndexSpec {
    /// Ascending index over `fields`, in order.
    pub fn ascending(fields: &[&str]) -> Self {
        Self {
            keys: fields
                .iter()
                .map(|f| IndexKey {
                    field: (*f).to_string(),
                    direction: 1,
                })
                .collect(),
        }
    }

    /// Conventional name: `topic_1_subtopic_1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("{}_{}", k.field, k.direction))
            .collect::<Vec<_>>()
            .join("_")
    }

    fn check(&self) -> StoreResult<()> {
        if self.keys.is_empty() {
            return Err(StoreError::rejected("createIndex", "index has no keys"));
        }
        if let Some(key) = self.keys.iter().find(|k| k.field.is_empty()) {
            return Err(StoreError::rejected(
                "createIndex",
                format!("empty field name with direction {}", key.direction),
            ));
        }
        if let Some(key) = self.keys.iter().find(|k| k.direction != 1 && k.direction != -1) {
            return Err(StoreError::rejected(
                "createIndex",
                format!("invalid direction {} for '{}'", key.direction, key.field),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Documents and index definitions of one collection.
///
/// This is also the on-disk format of [`JsonFileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub documents: Vec<Value>,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl Collection {
    pub fn count(&self, filter: Option<&Filter>) -> u64 {
        match filter {
            Some(f) => self.documents.iter().filter(|d| f.matches(d)).count() as u64,
            None => self.documents.len() as u64,
        }
    }

    pub fn delete_all(&mut self) -> DeleteResult {
        let deleted_count = self.documents.len() as u64;
        self.documents.clear();
        DeleteResult { deleted_count }
    }

    /// Validate every document first so a bad one leaves the collection untouched.
    pub fn insert_many(&mut self, documents: Vec<Value>) -> StoreResult<InsertManyResult> {
        if documents.is_empty() {
            return Err(StoreError::rejected("insertMany", "no documents given"));
        }
        if let Some(pos) = documents.iter().position(|d| !d.is_object()) {
            return Err(StoreError::rejected(
                "insertMany",
                format!("document {} is not an object", pos),
            ));
        }

        let mut inserted_ids = Vec::with_capacity(documents.len());
        for document in documents {
            let Value::Object(fields) = document else {
                continue;
            };
            let id = uuid::Uuid::new_v4().to_string();

            let mut with_id = Map::with_capacity(fields.len() + 1);
            with_id.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            with_id.extend(fields.into_iter().filter(|(k, _)| k != ID_FIELD));

            self.documents.push(Value::Object(with_id));
            inserted_ids.push(id);
        }

        Ok(InsertManyResult { inserted_ids })
    }

    pub fn create_index(&mut self, spec: &IndexSpec) -> StoreResult<String> {
        spec.check()?;
        let name = spec.name();
        if !self.indexes.iter().any(|i| i.name() == name) {
            self.indexes.push(spec.clone());
        }
        Ok(name)
    }

    pub fn distinct(&self, field: &str) -> Vec<Value> {
        let mut values: Vec<Value> = Vec::new();
        for value in self.documents.iter().filter_map(|d| d.get(field)) {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    }

    pub fn find_one(&self) -> Option<Value> {
        self.documents.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_names() {
        assert_eq!(IndexSpec::ascending(&["topic"]).name(), "topic_1");
        assert_eq!(
            IndexSpec::ascending(&["topic", "subtopic"]).name(),
            "topic_1_subtopic_1"
        );
    }

    #[test]
    fn test_insert_assigns_ids() {
        let mut collection = Collection::default();
        let result = collection
            .insert_many(vec![json!({ "topic": "A" }), json!({ "topic": "B", "_id": "stale" })])
            .unwrap();

        assert_eq!(result.inserted_ids.len(), 2);
        assert_ne!(result.inserted_ids[0], result.inserted_ids[1]);
        assert_eq!(collection.documents[1]["_id"], json!(result.inserted_ids[1]));
        assert_eq!(collection.documents[0].as_object().unwrap().keys().next().unwrap(), "_id");
    }

    #[test]
    fn test_insert_is_all_or_nothing() {
        let mut collection = Collection::default();
        let err = collection
            .insert_many(vec![json!({ "topic": "A" }), json!("oops")])
            .unwrap_err();

        assert!(err.to_string().contains("document 1"));
        assert_eq!(collection.count(None), 0);
        assert!(collection.insert_many(vec![]).is_err());
    }

    #[test]
    fn test_count_and_distinct() {
        let mut collection = Collection::default();
        collection
            .insert_many(vec![
                json!({ "topic": "B", "subtopic": "1" }),
                json!({ "topic": "A", "subtopic": "2" }),
                json!({ "topic": "B", "subtopic": "3" }),
            ])
            .unwrap();

        assert_eq!(collection.count(None), 3);
        assert_eq!(collection.count(Some(&Filter::field_eq("topic", "B"))), 2);
        assert_eq!(collection.distinct("topic"), vec![json!("B"), json!("A")]);
        assert!(collection.distinct("missing").is_empty());

        assert_eq!(collection.delete_all().deleted_count, 3);
        assert_eq!(collection.find_one(), None);
    }

    #[test]
    fn test_create_index_idempotent() {
        let mut collection = Collection::default();
        let spec = IndexSpec::ascending(&["topic", "subtopic"]);

        assert_eq!(collection.create_index(&spec).unwrap(), "topic_1_subtopic_1");
        collection.create_index(&spec).unwrap();
        assert_eq!(collection.indexes.len(), 1);

        assert!(collection.create_index(&IndexSpec { keys: vec![] }).is_err());
        assert!(collection.create_index(&IndexSpec::ascending(&[""])).is_err());
    }
}
