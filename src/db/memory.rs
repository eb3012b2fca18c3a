use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::{CollectionName, DocumentStream, RecordStore};
use crate::errors::AppError;

/// In-process store. Documents keep insertion order; filters are matched by
/// top-level field equality only.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionName, Vec<Document>>>,
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    matches!(document.get("_id"), Some(Bson::ObjectId(found)) if found == id)
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert(
        &self,
        collection: CollectionName,
        mut document: Document,
    ) -> Result<ObjectId, AppError> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => {
                return Err(AppError::Internal(format!(
                    "memory store only accepts ObjectId ids, got {other}"
                )))
            }
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };
        let mut guard = self.collections.write().await;
        guard.entry(collection).or_default().push(document);
        Ok(id)
    }

    async fn find(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<DocumentStream, AppError> {
        let guard = self.collections.read().await;
        let found: Vec<Document> = guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(stream::iter(found.into_iter().map(Ok)).boxed())
    }

    async fn find_one(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: CollectionName,
        id: ObjectId,
        fields: Document,
    ) -> Result<u64, AppError> {
        let mut guard = self.collections.write().await;
        let Some(doc) = guard
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, &id)))
        else {
            return Ok(0);
        };
        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(1)
    }

    async fn delete_by_id(
        &self,
        collection: CollectionName,
        id: ObjectId,
    ) -> Result<u64, AppError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| has_id(doc, &id)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<u64, AppError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !matches(doc, &filter));
        Ok((before - docs.len()) as u64)
    }
}
