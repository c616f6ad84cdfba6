use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    PlantId, PurchaseId, Result, StoreError,
    record::{Plant, PlantUpdate, Purchase, PurchaseDetails, User},
    store::{PlantStore, PurchaseStore, Upsert, UserStore, checked_quantity},
};

/// In-memory store implementation for testing and local runs.
///
/// This implementation keeps every collection in memory and provides
/// the same interface as the PostgreSQL implementation. Plants and
/// purchases keep insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    plants: Arc<RwLock<Vec<Plant>>>,
    purchases: Arc<RwLock<Vec<Purchase>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
    fail_on_insert_purchase: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent purchase inserts fail with `StoreError::Unavailable`.
    pub fn set_fail_on_insert_purchase(&self, fail: bool) {
        self.fail_on_insert_purchase.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored plants.
    pub async fn plant_count(&self) -> usize {
        self.plants.read().await.len()
    }

    /// Returns the number of stored purchases.
    pub async fn purchase_count(&self) -> usize {
        self.purchases.read().await.len()
    }

    /// Clears all collections.
    pub async fn clear(&self) {
        self.plants.write().await.clear();
        self.purchases.write().await.clear();
        self.users.write().await.clear();
    }
}

#[async_trait]
impl PlantStore for InMemoryStore {
    async fn insert_plant(&self, plant: Plant) -> Result<PlantId> {
        let id = plant.id;
        self.plants.write().await.push(plant);
        Ok(id)
    }

    async fn list_plants(&self, limit: usize) -> Result<Vec<Plant>> {
        let plants = self.plants.read().await;
        Ok(plants.iter().take(limit).cloned().collect())
    }

    async fn list_plants_by_seller(&self, seller_email: &str) -> Result<Vec<Plant>> {
        let plants = self.plants.read().await;
        Ok(plants
            .iter()
            .filter(|p| p.seller.email == seller_email)
            .cloned()
            .collect())
    }

    async fn get_plant(&self, id: PlantId) -> Result<Option<Plant>> {
        let plants = self.plants.read().await;
        Ok(plants.iter().find(|p| p.id == id).cloned())
    }

    async fn update_plant(&self, id: PlantId, update: PlantUpdate) -> Result<Option<Plant>> {
        let mut plants = self.plants.write().await;
        Ok(plants.iter_mut().find(|p| p.id == id).map(|plant| {
            plant.apply_update(update);
            plant.clone()
        }))
    }

    async fn delete_plant(&self, id: PlantId) -> Result<bool> {
        let mut plants = self.plants.write().await;
        let before = plants.len();
        plants.retain(|p| p.id != id);
        Ok(plants.len() != before)
    }

    async fn adjust_quantity(&self, id: PlantId, delta: i64) -> Result<Plant> {
        // Check and write under one lock so concurrent adjustments can't oversell.
        let mut plants = self.plants.write().await;
        let plant = plants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::PlantNotFound(id))?;

        plant.quantity = checked_quantity(id, plant.quantity, delta)?;
        Ok(plant.clone())
    }
}

#[async_trait]
impl PurchaseStore for InMemoryStore {
    async fn insert_purchase(&self, purchase: Purchase) -> Result<PurchaseId> {
        if self.fail_on_insert_purchase.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "purchase insert rejected".to_string(),
            ));
        }

        let id = purchase.id;
        self.purchases.write().await.push(purchase);
        Ok(id)
    }

    async fn purchases_for_customer(&self, email: &str) -> Result<Vec<PurchaseDetails>> {
        let purchases = self.purchases.read().await;
        let plants = self.plants.read().await;

        let mut joined: Vec<PurchaseDetails> = purchases
            .iter()
            .filter(|p| p.customer.email == email)
            .filter_map(|p| {
                plants
                    .iter()
                    .find(|plant| plant.id == p.plant_id)
                    .map(|plant| PurchaseDetails::join(p.clone(), plant))
            })
            .collect();
        joined.sort_by_key(|d| d.purchase.created_at);
        Ok(joined)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user_if_absent(&self, user: User) -> Result<Upsert<User>> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(&user.email) {
            return Ok(Upsert::Existing(existing.clone()));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(Upsert::Inserted(user))
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
