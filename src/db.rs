//! Record store: two collections of schemaless documents behind one async
//! trait. `MongoStore` talks to MongoDB, `MemoryStore` keeps everything in
//! process and only understands top-level equality filters.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use mongodb::bson::{oid::ObjectId, Document};

use crate::errors::AppError;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Lazy, finite sequence of documents. Calling `find` again restarts it.
pub type DocumentStream = BoxStream<'static, Result<Document, AppError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Plants,
    Harvests,
}

impl CollectionName {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionName::Plants => "plants",
            CollectionName::Harvests => "harvests",
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Inserts one document and returns its store-generated id.
    async fn insert(
        &self,
        collection: CollectionName,
        document: Document,
    ) -> Result<ObjectId, AppError>;

    async fn find(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<DocumentStream, AppError>;

    async fn find_one(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<Option<Document>, AppError>;

    async fn find_one_or_fail(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<Document, AppError> {
        self.find_one(collection, filter)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Sets `fields` on the document with `id`. Returns the matched count,
    /// zero when nothing has that id.
    async fn update_by_id(
        &self,
        collection: CollectionName,
        id: ObjectId,
        fields: Document,
    ) -> Result<u64, AppError>;

    async fn delete_by_id(&self, collection: CollectionName, id: ObjectId)
        -> Result<u64, AppError>;

    async fn delete_many(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<u64, AppError>;

    /// Releases the backend. Called once at shutdown.
    async fn close(&self) {}
}
