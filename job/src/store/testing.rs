//! Failure-injecting store for tests.

use async_trait::async_trait;
use serde_json::Value;

use super::{DeleteResult, DocumentStore, Filter, IndexSpec, InsertManyResult, MemoryStore};
use crate::error::{StoreError, StoreResult};

/// Operations a [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Count,
    DeleteAll,
    InsertMany,
    CreateIndex,
    Distinct,
    FindOne,
}

/// Wraps a [`MemoryStore`] and fails the chosen operations.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing: Vec<Op>,
    /// Drop this many ids from every insert acknowledgement.
    pub short_ack: usize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: Vec::new(),
            short_ack: 0,
        }
    }

    pub fn failing(mut self, op: Op) -> Self {
        self.failing.push(op);
        self
    }

    fn check(&self, op: Op) -> StoreResult<()> {
        if self.failing.contains(&op) {
            Err(StoreError::rejected("injected", format!("{:?} failure", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    fn namespace(&self) -> String {
        self.inner.namespace()
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        self.check(Op::Count)?;
        self.inner.count(filter).await
    }

    async fn delete_all(&mut self) -> StoreResult<DeleteResult> {
        self.check(Op::DeleteAll)?;
        self.inner.delete_all().await
    }

    async fn insert_many(&mut self, documents: Vec<Value>) -> StoreResult<InsertManyResult> {
        self.check(Op::InsertMany)?;
        let mut result = self.inner.insert_many(documents).await?;
        let keep = result.inserted_ids.len().saturating_sub(self.short_ack);
        result.inserted_ids.truncate(keep);
        Ok(result)
    }

    async fn create_index(&mut self, spec: &IndexSpec) -> StoreResult<String> {
        self.check(Op::CreateIndex)?;
        self.inner.create_index(spec).await
    }

    async fn distinct(&self, field: &str) -> StoreResult<Vec<Value>> {
        self.check(Op::Distinct)?;
        self.inner.distinct(field).await
    }

    async fn find_one(&self) -> StoreResult<Option<Value>> {
        self.check(Op::FindOne)?;
        self.inner.find_one().await
    }
}
