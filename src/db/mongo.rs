use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::info;

use super::{CollectionName, DocumentStream, RecordStore};
use crate::errors::AppError;

pub const DEFAULT_DATABASE: &str = "plantsDatabase";

pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connects and pings the server so a bad URI fails at startup rather
    /// than on the first request. The database comes from the URI path,
    /// falling back to `plantsDatabase`.
    pub async fn connect(uri: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.server_selection_timeout = Some(Duration::from_secs(10));
        client_options.retry_writes = Some(false);

        let client = Client::with_options(client_options)?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        db.run_command(doc! { "ping": 1 }).await?;
        info!(database = db.name(), "connected to MongoDB");

        Ok(Self { client, db })
    }

    fn collection(&self, name: CollectionName) -> Collection<Document> {
        self.db.collection::<Document>(name.as_str())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    fn backend_tag(&self) -> &'static str {
        "mongodb"
    }

    async fn insert(
        &self,
        collection: CollectionName,
        document: Document,
    ) -> Result<ObjectId, AppError> {
        let result = self.collection(collection).insert_one(document).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Internal("inserted id is not an ObjectId".to_string()))
    }

    async fn find(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<DocumentStream, AppError> {
        let cursor = self.collection(collection).find(filter).await?;
        Ok(cursor.map_err(AppError::from).boxed())
    }

    async fn find_one(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn update_by_id(
        &self,
        collection: CollectionName,
        id: ObjectId,
        fields: Document,
    ) -> Result<u64, AppError> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_by_id(
        &self,
        collection: CollectionName,
        id: ObjectId,
    ) -> Result<u64, AppError> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_many(
        &self,
        collection: CollectionName,
        filter: Document,
    ) -> Result<u64, AppError> {
        let result = self.collection(collection).delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
