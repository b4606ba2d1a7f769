//! JSON file document store.
//!
//! A collection lives at `<data_dir>/<database>/<collection>.json`:
//!
//! ```json
//! { "documents": [ { "_id": "...", "topic": "..." } ], "indexes": [ { "keys": [...] } ] }
//! ```
//!
//! Every write replaces the whole file through a temporary file and a rename,
//! so a reader sees either the old collection or the new one.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{Collection, DeleteResult, DocumentStore, Filter, IndexSpec, InsertManyResult};
use crate::error::{StoreError, StoreResult};

/// A collection persisted as one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    namespace: String,
    collection: Collection,
}

impl JsonFileStore {
    /// Open a collection, reading it from disk if the file exists.
    ///
    /// A missing file is an empty collection; it is created on first write.
    pub async fn open(
        data_dir: impl AsRef<Path>,
        database: &str,
        collection: &str,
    ) -> StoreResult<Self> {
        let path = data_dir
            .as_ref()
            .join(database)
            .join(format!("{}.json", collection));

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::Io(e)),
        };

        let collection_data = match contents {
            Some(contents) => {
                serde_json::from_str::<Collection>(&contents).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
            None => Collection::default(),
        };

        Ok(Self {
            path,
            namespace: format!("{}.{}", database, collection),
            collection: collection_data,
        })
    }

    /// Path of the collection file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `next` to disk, then make it the current state.
    async fn commit(&mut self, next: Collection) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let content = serde_json::to_string_pretty(&next)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        self.collection = next;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn namespace(&self) -> String {
        self.namespace.clone()
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        Ok(self.collection.count(filter))
    }

    async fn delete_all(&mut self) -> StoreResult<DeleteResult> {
        let mut next = self.collection.clone();
        let result = next.delete_all();
        self.commit(next).await?;
        Ok(result)
    }

    async fn insert_many(&mut self, documents: Vec<Value>) -> StoreResult<InsertManyResult> {
        let mut next = self.collection.clone();
        let result = next.insert_many(documents)?;
        self.commit(next).await?;
        Ok(result)
    }

    async fn create_index(&mut self, spec: &IndexSpec) -> StoreResult<String> {
        let mut next = self.collection.clone();
        let name = next.create_index(spec)?;
        if next != self.collection {
            self.commit(next).await?;
        }
        Ok(name)
    }

    async fn distinct(&self, field: &str) -> StoreResult<Vec<Value>> {
        Ok(self.collection.distinct(field))
    }

    async fn find_one(&self) -> StoreResult<Option<Value>> {
        Ok(self.collection.find_one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();

        assert_eq!(store.count(None).await.unwrap(), 0);
        assert_eq!(store.namespace(), "quizdb.quiz_data");
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();
            store
                .insert_many(vec![
                    json!({ "topic": "Science", "subtopic": "Physics" }),
                    json!({ "topic": "Art", "subtopic": "Painting" }),
                ])
                .await
                .unwrap();
            store.create_index(&IndexSpec::ascending(&["topic"])).await.unwrap();
        }

        let store = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();
        assert_eq!(store.count(None).await.unwrap(), 2);
        assert_eq!(store.count(Some(&Filter::field_eq("topic", "Art"))).await.unwrap(), 1);
        assert_eq!(store.collection.indexes.len(), 1);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_delete_all_persists() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();
        store.insert_many(vec![json!({ "topic": "A" })]).await.unwrap();
        assert_eq!(store.delete_all().await.unwrap().deleted_count, 1);

        let reopened = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();
        assert_eq!(reopened.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_insert_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();
        store.insert_many(vec![json!({ "topic": "A" })]).await.unwrap();

        assert!(store.insert_many(vec![json!(1)]).await.is_err());

        let reopened = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();
        assert_eq!(reopened.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap();

        // A non-empty directory where the collection file should go
        std::fs::create_dir_all(store.path().join("occupied")).unwrap();

        let err = store.insert_many(vec![json!({ "topic": "A" })]).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("quizdb")).unwrap();
        std::fs::write(dir.path().join("quizdb/quiz_data.json"), "not json").unwrap();

        let err = JsonFileStore::open(dir.path(), "quizdb", "quiz_data").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
