//! Arbolitos web: plant records and their harvests, served as HTML pages
//! over a MongoDB (or in-memory) record store.

use std::sync::Arc;

pub mod cli;
pub mod db;
pub mod errors;
pub mod http;
pub mod models;
pub mod repo;
pub mod views;

pub use db::{MemoryStore, MongoStore, RecordStore};
pub use errors::AppError;
pub use http::build_router;
pub use repo::{HarvestRepository, PlantRepository};

/// Per-process context handed to every handler. Cloning is cheap; both
/// repositories share the same store handle.
#[derive(Clone)]
pub struct AppState {
    pub plants: PlantRepository,
    pub harvests: HarvestRepository,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            plants: PlantRepository::new(store.clone()),
            harvests: HarvestRepository::new(store),
        }
    }
}
