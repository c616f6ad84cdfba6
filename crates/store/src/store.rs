use async_trait::async_trait;

use crate::{
    PlantId, PurchaseId, Result, StoreError,
    record::{Plant, PlantUpdate, Purchase, PurchaseDetails, User},
};

/// Largest stock level a plant can hold.
pub const MAX_QUANTITY: u32 = u32::MAX;

/// Outcome of an insert-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert<T> {
    /// The record was written by this call.
    Inserted(T),
    /// A record already existed and was left untouched.
    Existing(T),
}

impl<T> Upsert<T> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Upsert::Inserted(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Upsert::Inserted(value) | Upsert::Existing(value) => value,
        }
    }
}

/// Storage for catalog plants.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait PlantStore: Send + Sync {
    /// Persists a plant record as given and returns its id.
    async fn insert_plant(&self, plant: Plant) -> Result<PlantId>;

    /// Returns up to `limit` plants in insertion order.
    async fn list_plants(&self, limit: usize) -> Result<Vec<Plant>>;

    /// Returns every plant listed by the given seller, in insertion order.
    async fn list_plants_by_seller(&self, seller_email: &str) -> Result<Vec<Plant>>;

    /// Fetches a plant by id. Returns None if it doesn't exist.
    async fn get_plant(&self, id: PlantId) -> Result<Option<Plant>>;

    /// Replaces the editable fields of a plant.
    ///
    /// Returns the updated record, or None if the plant doesn't exist.
    async fn update_plant(&self, id: PlantId, update: PlantUpdate) -> Result<Option<Plant>>;

    /// Removes a plant. Returns false if there was nothing to remove.
    async fn delete_plant(&self, id: PlantId) -> Result<bool>;

    /// Adds `delta` to the plant's quantity in one atomic step.
    ///
    /// The change is applied only if the new quantity stays within
    /// `0..=MAX_QUANTITY`; otherwise the stored quantity is left unchanged and
    /// `InsufficientStock` (or `QuantityOverflow`) is returned. Returns the
    /// plant as it is after the change.
    async fn adjust_quantity(&self, id: PlantId, delta: i64) -> Result<Plant>;
}

/// Storage for purchase records.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Persists a purchase record and returns its id.
    async fn insert_purchase(&self, purchase: Purchase) -> Result<PurchaseId>;

    /// Returns the purchases of one customer, oldest first, joined with
    /// their plants.
    ///
    /// Purchases whose plant no longer exists are not returned.
    async fn purchases_for_customer(&self, email: &str) -> Result<Vec<PurchaseDetails>>;
}

/// Storage for users, keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Writes the user unless one with the same email exists.
    ///
    /// The first write wins: an existing record is returned unchanged.
    async fn insert_user_if_absent(&self, user: User) -> Result<Upsert<User>>;

    /// Fetches a user by email.
    async fn get_user(&self, email: &str) -> Result<Option<User>>;
}

/// Everything the marketplace needs from a backing store.
pub trait Store: PlantStore + PurchaseStore + UserStore {}

impl<T: PlantStore + PurchaseStore + UserStore + ?Sized> Store for T {}

/// Computes `quantity + delta` within `0..=MAX_QUANTITY`.
pub fn checked_quantity(plant_id: PlantId, quantity: u32, delta: i64) -> Result<u32> {
    let overflow = || StoreError::QuantityOverflow {
        plant_id,
        delta,
        available: quantity,
    };
    let next = i64::from(quantity).checked_add(delta).ok_or_else(overflow)?;
    if next < 0 {
        return Err(StoreError::InsufficientStock {
            plant_id,
            requested: delta.unsigned_abs(),
            available: quantity,
        });
    }
    u32::try_from(next).map_err(|_| overflow())
}
