//! Plant and harvest operations over a [`RecordStore`].
//!
//! Harvests point at plants through [`PlantRef`], a plain text copy of the
//! plant id. The store never checks it; removing a plant's harvests is the
//! caller's job (see `http::delete_plant`).

use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt};
use mongodb::bson::{self, doc, oid::ObjectId};
use tracing::{debug, info};

use crate::db::{CollectionName, RecordStore};
use crate::errors::AppError;
use crate::models::{Harvest, HarvestFields, Plant, PlantFields, PlantRef};

pub type PlantStream = BoxStream<'static, Result<Plant, AppError>>;
pub type HarvestStream = BoxStream<'static, Result<Harvest, AppError>>;

#[derive(Clone)]
pub struct PlantRepository {
    store: Arc<dyn RecordStore>,
}

impl PlantRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, fields: &PlantFields) -> Result<ObjectId, AppError> {
        let document = bson::to_document(fields)?;
        let id = self.store.insert(CollectionName::Plants, document).await?;
        info!(plant_id = %id, "plant created");
        Ok(id)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Plant, AppError> {
        let document = self
            .store
            .find_one_or_fail(CollectionName::Plants, doc! { "_id": *id })
            .await?;
        Ok(bson::from_document(document)?)
    }

    /// All plants in store order. The stream is consumed once; call again to
    /// start over.
    pub async fn list(&self) -> Result<PlantStream, AppError> {
        let documents = self.store.find(CollectionName::Plants, doc! {}).await?;
        Ok(documents
            .map(|found| found.and_then(|doc| Ok(bson::from_document::<Plant>(doc)?)))
            .boxed())
    }

    /// Overwrites all editable fields, absent ones included. Updating an id
    /// that matches nothing is not an error.
    pub async fn update(&self, id: &ObjectId, fields: &PlantFields) -> Result<(), AppError> {
        let set = bson::to_document(fields)?;
        let matched = self
            .store
            .update_by_id(CollectionName::Plants, *id, set)
            .await?;
        if matched == 0 {
            debug!(plant_id = %id, "update matched no plant");
        } else {
            info!(plant_id = %id, "plant updated");
        }
        Ok(())
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), AppError> {
        let deleted = self
            .store
            .delete_by_id(CollectionName::Plants, *id)
            .await?;
        if deleted > 0 {
            info!(plant_id = %id, "plant deleted");
        } else {
            debug!(plant_id = %id, "delete matched no plant");
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct HarvestRepository {
    store: Arc<dyn RecordStore>,
}

impl HarvestRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Records a harvest. The plant is not looked up.
    pub async fn create(
        &self,
        plant_id: &PlantRef,
        fields: HarvestFields,
    ) -> Result<ObjectId, AppError> {
        let harvest = Harvest {
            id: None,
            plant_id: plant_id.clone(),
            quantity: fields.quantity,
            date: fields.date,
        };
        let document = bson::to_document(&harvest)?;
        let id = self
            .store
            .insert(CollectionName::Harvests, document)
            .await?;
        info!(harvest_id = %id, plant_id = plant_id.as_str(), "harvest recorded");
        Ok(id)
    }

    pub async fn list_by_plant(&self, plant_id: &PlantRef) -> Result<HarvestStream, AppError> {
        let documents = self
            .store
            .find(
                CollectionName::Harvests,
                doc! { "plant_id": plant_id.as_str() },
            )
            .await?;
        Ok(documents
            .map(|found| found.and_then(|doc| Ok(bson::from_document::<Harvest>(doc)?)))
            .boxed())
    }

    pub async fn delete_by_plant(&self, plant_id: &PlantRef) -> Result<u64, AppError> {
        let deleted = self
            .store
            .delete_many(
                CollectionName::Harvests,
                doc! { "plant_id": plant_id.as_str() },
            )
            .await?;
        info!(plant_id = plant_id.as_str(), deleted, "harvests deleted");
        Ok(deleted)
    }
}
