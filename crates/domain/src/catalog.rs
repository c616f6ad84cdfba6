//! Plant catalog service.

use common::PlantId;
use rust_decimal::Decimal;
use store::{NewPlant, Plant, PlantStore, PlantUpdate};

use crate::error::{DomainError, ValidationError};

/// Most plants a single listing request returns.
pub const DEFAULT_LIST_CAP: usize = 20;

/// Service for managing the plant catalog.
///
/// Validates seller input before it reaches the store, and is the only
/// path through which stock levels change.
#[derive(Clone)]
pub struct CatalogService<S: PlantStore> {
    store: S,
    list_cap: usize,
}

impl<S: PlantStore> CatalogService<S> {
    /// Creates a catalog service with the default listing cap.
    pub fn new(store: S) -> Self {
        Self::with_list_cap(store, DEFAULT_LIST_CAP)
    }

    /// Creates a catalog service that never lists more than `list_cap` plants.
    pub fn with_list_cap(store: S, list_cap: usize) -> Self {
        Self { store, list_cap }
    }

    pub fn list_cap(&self) -> usize {
        self.list_cap
    }

    /// Validates and stores a new plant, returning its id.
    #[tracing::instrument(skip(self, plant), fields(name = %plant.name, seller = %plant.seller.email))]
    pub async fn create_plant(&self, plant: NewPlant) -> Result<PlantId, DomainError> {
        validate_listing(&plant.name, plant.price)?;

        let id = self.store.insert_plant(Plant::from_new(PlantId::new(), plant)).await?;
        tracing::info!(%id, "plant created");
        Ok(id)
    }

    /// Lists plants in store order, never more than the configured cap.
    #[tracing::instrument(skip(self))]
    pub async fn list_plants(&self, limit: Option<usize>) -> Result<Vec<Plant>, DomainError> {
        let limit = limit.unwrap_or(self.list_cap).min(self.list_cap);
        Ok(self.store.list_plants(limit).await?)
    }

    /// Lists every plant a seller has listed.
    #[tracing::instrument(skip(self))]
    pub async fn list_plants_by_seller(&self, email: &str) -> Result<Vec<Plant>, DomainError> {
        Ok(self.store.list_plants_by_seller(email).await?)
    }

    /// Fetches a plant by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_plant(&self, id: PlantId) -> Result<Option<Plant>, DomainError> {
        Ok(self.store.get_plant(id).await?)
    }

    /// Replaces a plant's editable fields.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_plant(
        &self,
        id: PlantId,
        update: PlantUpdate,
    ) -> Result<Plant, DomainError> {
        validate_listing(&update.name, update.price)?;

        self.store
            .update_plant(id, update)
            .await?
            .ok_or(DomainError::PlantNotFound(id))
    }

    /// Deletes a plant. Returns false when it was already gone.
    #[tracing::instrument(skip(self))]
    pub async fn delete_plant(&self, id: PlantId) -> Result<bool, DomainError> {
        let deleted = self.store.delete_plant(id).await?;
        if !deleted {
            tracing::debug!(%id, "delete of absent plant ignored");
        }
        Ok(deleted)
    }

    /// Takes `amount` out of stock, or fails without touching it.
    #[tracing::instrument(skip(self))]
    pub async fn decrement_quantity(&self, id: PlantId, amount: u32) -> Result<Plant, DomainError> {
        if amount == 0 {
            return Err(ValidationError::InvalidQuantity { quantity: amount }.into());
        }
        self.adjust_quantity(id, -i64::from(amount)).await
    }

    /// Puts `amount` back into stock.
    #[tracing::instrument(skip(self))]
    pub async fn restore_quantity(&self, id: PlantId, amount: u32) -> Result<Plant, DomainError> {
        self.adjust_quantity(id, i64::from(amount)).await
    }

    /// Applies a signed change to the stock level.
    ///
    /// The change is rejected with `InsufficientStock` when it would make the
    /// quantity negative; the stored quantity is then left as it was.
    #[tracing::instrument(skip(self))]
    pub async fn adjust_quantity(&self, id: PlantId, delta: i64) -> Result<Plant, DomainError> {
        let plant = self.store.adjust_quantity(id, delta).await?;
        tracing::debug!(%id, delta, quantity = plant.quantity, "stock adjusted");
        Ok(plant)
    }
}

fn validate_listing(name: &str, price: Decimal) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if price < Decimal::ZERO {
        return Err(ValidationError::NegativePrice { price });
    }
    Ok(())
}
