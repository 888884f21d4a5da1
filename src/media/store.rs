//! Persistence collaborator used by the pipeline.

use super::error::StoreError;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub type Document = serde_json::Value;

/// Document-oriented key/value store.
///
/// Methods take `&self` so several reads can be in flight at once; a store
/// that needs mutation uses interior mutability. Futures are not required to
/// be `Send`, matching the single-threaded browser executor.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn put(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError>;
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
    /// Shallow-merge the fields of `partial` into an existing document.
    async fn update(&self, collection: &str, key: &str, partial: Document)
        -> Result<(), StoreError>;
}

/// One stored chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkDocument {
    pub data: String,
    pub index: usize,
    pub file_id: String,
    pub total_chunks: usize,
}

/// In-memory store; keys within a collection are kept sorted.
#[derive(Default, Debug)]
pub struct MemoryStore {
    collections: RefCell<FnvHashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .borrow()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn keys(&self, collection: &str) -> Vec<String> {
        self.collections
            .borrow()
            .get(collection)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryStore {
    async fn put(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        if let Some(c) = self.collections.borrow_mut().get_mut(collection) {
            c.remove(key);
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        key: &str,
        partial: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.borrow_mut();
        let existing = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;
        match (existing, partial) {
            (Document::Object(target), Document::Object(fields)) => {
                for (name, value) in fields {
                    target.insert(name, value);
                }
            }
            (slot, other) => *slot = other,
        }
        Ok(())
    }
}
