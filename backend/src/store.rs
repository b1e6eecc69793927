use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::PropertyListing;
use crate::storage::{LocalStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Stored listings are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Property not found")]
    NotFound(String),
}

/// The listing collection, read and written as one JSON array under a fixed key.
///
/// All writes go through `write_lock`, so appends from concurrent requests are
/// applied one after another instead of overwriting each other.
pub struct ListingStore {
    storage: Arc<dyn LocalStorage>,
    key: String,
    write_lock: Mutex<()>,
}

impl ListingStore {
    pub fn new(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns every listing in insertion order, seeding the sample listings
    /// if nothing has been stored yet.
    pub async fn load(&self) -> Result<Vec<PropertyListing>, StoreError> {
        if let Some(listings) = self.read().await? {
            return Ok(listings);
        }

        let _guard = self.write_lock.lock().await;
        // Another request may have seeded while we waited.
        if let Some(listings) = self.read().await? {
            return Ok(listings);
        }
        let seeded = sample_listings();
        self.write(&seeded).await?;
        log::info!("Seeded {} sample properties under {}", seeded.len(), self.key);
        Ok(seeded)
    }

    /// Appends one listing and returns it as stored. A listing whose id is
    /// already taken gets the next free one.
    pub async fn append(&self, mut listing: PropertyListing) -> Result<PropertyListing, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut listings = self.read().await?.unwrap_or_default();

        while listings.iter().any(|existing| existing.id == listing.id) {
            listing.id = next_id(&listing.id);
        }
        listings.push(listing.clone());
        self.write(&listings).await?;

        log::info!("Stored property {} ({} total)", listing.id, listings.len());
        Ok(listing)
    }

    pub async fn find(&self, id: &str) -> Result<PropertyListing, StoreError> {
        self.load()
            .await?
            .into_iter()
            .find(|listing| listing.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn read(&self) -> Result<Option<Vec<PropertyListing>>, StoreError> {
        match self.storage.get_item(&self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, listings: &[PropertyListing]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(listings)?;
        self.storage.set_item(&self.key, &raw).await?;
        Ok(())
    }
}

fn next_id(id: &str) -> String {
    match id.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(n) => n.to_string(),
        None => format!("{}-1", id),
    }
}

fn sample(
    id: &str,
    name: &str,
    description: &str,
    photo: &str,
    total_price: f64,
    shares: u64,
    created_at: &str,
) -> PropertyListing {
    PropertyListing {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        photo: photo.to_string(),
        total_price,
        shares,
        price_per_share: total_price / shares as f64,
        created_at: created_at.to_string(),
    }
}

/// The six listings every fresh store starts with.
pub fn sample_listings() -> Vec<PropertyListing> {
    vec![
        sample(
            "1",
            "Ocean View Villa",
            "Luxurious beachfront villa with panoramic ocean views, private pool, and modern amenities. Perfect for vacation rentals or permanent residence.",
            "https://images.unsplash.com/photo-1613490493576-7fde63acd811?w=800&h=600&fit=crop",
            2_500_000.0,
            1000,
            "2024-01-15T10:00:00Z",
        ),
        sample(
            "2",
            "Mountain Retreat Cabin",
            "Cozy log cabin nestled in the mountains with stunning forest views, fireplace, and hiking trails nearby. Ideal for nature lovers.",
            "https://images.unsplash.com/photo-1449824913935-59a10b8d2000?w=800&h=600&fit=crop",
            450_000.0,
            450,
            "2024-01-20T14:30:00Z",
        ),
        sample(
            "3",
            "Downtown Penthouse",
            "Modern penthouse in the heart of the city with floor-to-ceiling windows, rooftop terrace, and premium finishes throughout.",
            "https://images.unsplash.com/photo-1545324418-cc1a3fa10c00?w=800&h=600&fit=crop",
            1_800_000.0,
            900,
            "2024-02-01T09:15:00Z",
        ),
        sample(
            "4",
            "Historic Brownstone",
            "Beautifully restored historic brownstone with original architectural details, modern kitchen, and private garden.",
            "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800&h=600&fit=crop",
            1_200_000.0,
            600,
            "2024-02-10T16:45:00Z",
        ),
        sample(
            "5",
            "Lakefront Estate",
            "Sprawling estate on pristine lakefront property with boat dock, tennis court, and multiple guest houses.",
            "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800&h=600&fit=crop",
            3_500_000.0,
            1750,
            "2024-02-15T11:20:00Z",
        ),
        sample(
            "6",
            "Desert Oasis Villa",
            "Modern villa in desert landscape with infinity pool, outdoor kitchen, and stunning sunset views over the mountains.",
            "https://images.unsplash.com/photo-1600596542815-ffad4c69b9a8?w=800&h=600&fit=crop",
            950_000.0,
            950,
            "2024-02-20T13:10:00Z",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, ListingStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ListingStore::new(storage.clone(), "realEstateProperties");
        (storage, store)
    }

    fn listing(id: &str) -> PropertyListing {
        sample(id, "Test Villa", "A villa", "https://example.com/v.jpg", 1_000_000.0, 500, "2025-01-01T00:00:00.000Z")
    }

    #[tokio::test]
    async fn first_load_seeds_and_persists_samples() {
        let (storage, store) = store();
        let first = store.load().await.unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0].name, "Ocean View Villa");
        assert!(storage.get_item("realEstateProperties").await.unwrap().is_some());

        let second = store.load().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sample_prices_per_share_match_their_totals() {
        for listing in sample_listings() {
            assert_eq!(listing.price_per_share, listing.total_price / listing.shares as f64);
        }
        let ids: Vec<_> = sample_listings().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);
    }

    #[tokio::test]
    async fn append_lands_last() {
        let (_, store) = store();
        let before = store.load().await.unwrap();
        let stored = store.append(listing("1735689600000")).await.unwrap();

        let after = store.load().await.unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.last(), Some(&stored));
    }

    #[tokio::test]
    async fn append_does_not_seed_an_empty_store() {
        let (_, store) = store();
        store.append(listing("42")).await.unwrap();
        let listings = store.load().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "42");
    }

    #[tokio::test]
    async fn append_bumps_colliding_ids() {
        let (_, store) = store();
        store.load().await.unwrap();
        let stored = store.append(listing("1")).await.unwrap();
        assert_eq!(stored.id, "7");

        let named = store.append(listing("villa")).await.unwrap();
        let again = store.append(listing("villa")).await.unwrap();
        assert_eq!(named.id, "villa");
        assert_eq!(again.id, "villa-1");
    }

    #[tokio::test]
    async fn largest_numeric_id_falls_back_to_suffix() {
        let (_, store) = store();
        let max = u64::MAX.to_string();
        store.append(listing(&max)).await.unwrap();
        let bumped = store.append(listing(&max)).await.unwrap();
        assert_eq!(bumped.id, format!("{}-1", max));
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let (_, store) = store();
        let store = Arc::new(store);
        store.load().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.append(listing("100")).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let listings = store.load().await.unwrap();
        assert_eq!(listings.len(), 14);
        let mut ids: Vec<_> = listings.iter().map(|l| l.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 14);
    }

    #[tokio::test]
    async fn find_reports_missing_ids() {
        let (_, store) = store();
        assert_eq!(store.find("3").await.unwrap().name, "Downtown Penthouse");
        assert!(matches!(store.find("999").await, Err(StoreError::NotFound(id)) if id == "999"));
    }

    #[tokio::test]
    async fn corrupt_value_is_an_error() {
        let (storage, store) = store();
        storage.set_item("realEstateProperties", "{not json").await.unwrap();
        assert!(matches!(store.load().await, Err(StoreError::Corrupt(_))));
    }
}
