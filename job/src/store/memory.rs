//! In-process document store.

use async_trait::async_trait;
use serde_json::Value;

use super::{Collection, DeleteResult, DocumentStore, Filter, IndexSpec, InsertManyResult};
use crate::error::StoreResult;

/// A collection held in memory. Nothing survives the process.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    namespace: String,
    collection: Collection,
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            collection: Collection::default(),
        }
    }

    /// Start from existing documents, as if left by an earlier run.
    pub fn with_documents(namespace: impl Into<String>, documents: Vec<Value>) -> Self {
        Self {
            namespace: namespace.into(),
            collection: Collection {
                documents,
                indexes: Vec::new(),
            },
        }
    }

    pub fn documents(&self) -> &[Value] {
        &self.collection.documents
    }

    pub fn indexes(&self) -> &[IndexSpec] {
        &self.collection.indexes
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory.quiz_data")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn namespace(&self) -> String {
        self.namespace.clone()
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        Ok(self.collection.count(filter))
    }

    async fn delete_all(&mut self) -> StoreResult<DeleteResult> {
        Ok(self.collection.delete_all())
    }

    async fn insert_many(&mut self, documents: Vec<Value>) -> StoreResult<InsertManyResult> {
        self.collection.insert_many(documents)
    }

    async fn create_index(&mut self, spec: &IndexSpec) -> StoreResult<String> {
        self.collection.create_index(spec)
    }

    async fn distinct(&self, field: &str) -> StoreResult<Vec<Value>> {
        Ok(self.collection.distinct(field))
    }

    async fn find_one(&self) -> StoreResult<Option<Value>> {
        Ok(self.collection.find_one())
    }
}
