//! Storage layer for the plant marketplace.
//!
//! Defines the persisted records (plants, purchases, users), the storage
//! traits the service layer is written against, and two implementations:
//! an in-memory store for tests and local runs, and a PostgreSQL store.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{PlantId, PurchaseId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use record::{
    Customer, NewPlant, NewPurchase, NewUser, Plant, PlantUpdate, Purchase, PurchaseDetails,
    Role, Seller, User,
};
pub use store::{MAX_QUANTITY, PlantStore, PurchaseStore, Store, Upsert, UserStore};
