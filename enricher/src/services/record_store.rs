//! In-memory catalog record store

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use shared::{SharedError, StoredRecord};
use crate::error::{EnrichError, EnrichResult};
use crate::traits::RecordStore;

#[derive(Debug, Default)]
struct Catalog {
    records: BTreeMap<u64, StoredRecord>,
    next_id: u64,
}

/// Record store kept in process memory; ids are assigned sequentially from 1
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    catalog: Arc<RwLock<Catalog>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the demo catalog
    pub async fn with_seed_catalog() -> EnrichResult<Self> {
        let store = Self::new();
        for record in seed_catalog() {
            store.upsert(record).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self) -> EnrichResult<Vec<StoredRecord>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.records.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> EnrichResult<Option<StoredRecord>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.records.get(&id).cloned())
    }

    async fn upsert(&self, mut record: StoredRecord) -> EnrichResult<StoredRecord> {
        if record.name.trim().is_empty() {
            return Err(EnrichError::InvalidSubject(SharedError::EmptyName));
        }

        let mut catalog = self.catalog.write().await;
        if record.id == 0 {
            catalog.next_id = catalog.next_id.max(1);
            record.id = catalog.next_id;
        }
        catalog.next_id = catalog.next_id.max(record.id.saturating_add(1));
        catalog.records.insert(record.id, record.clone());

        debug!(id = record.id, name = %record.name, "Upserted record");
        Ok(record)
    }

    async fn delete(&self, id: u64) -> EnrichResult<bool> {
        let mut catalog = self.catalog.write().await;
        Ok(catalog.records.remove(&id).is_some())
    }
}

/// The demo catalog the front end ships with
pub fn seed_catalog() -> Vec<StoredRecord> {
    let record = |name: &str, species: &str, category: &str, habitat: &str, image: &str| StoredRecord {
        id: 0,
        name: name.to_string(),
        species: Some(species.to_string()),
        category: Some(category.to_string()),
        habitat: Some(habitat.to_string()),
        diet: None,
        lifespan: None,
        image_ref: Some(image.to_string()),
    };

    vec![
        record(
            "African Lion",
            "Panthera leo",
            "mammals",
            "African Savanna",
            "https://images.unsplash.com/photo-1614027164847-1b28cfe1df60?w=600",
        ),
        record(
            "Golden Eagle",
            "Aquila chrysaetos",
            "birds",
            "Mountain Ranges",
            "https://images.unsplash.com/photo-1611689342806-0863700ce1e4?w=600",
        ),
        record(
            "Green Sea Turtle",
            "Chelonia mydas",
            "marine",
            "Tropical Oceans",
            "https://images.unsplash.com/photo-1437622368342-7a3d73a34c8f?w=600",
        ),
        record(
            "Monarch Butterfly",
            "Danaus plexippus",
            "insects",
            "North American Gardens",
            "https://images.unsplash.com/photo-1595855759920-86582396756c?w=600",
        ),
        record(
            "Komodo Dragon",
            "Varanus komodoensis",
            "reptiles",
            "Indonesian Islands",
            "https://images.unsplash.com/photo-1577493340887-b7bfff550145?w=600",
        ),
    ]
}
