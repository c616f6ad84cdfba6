//! Shared identifier types for the plant marketplace.

pub mod types;

pub use types::{PlantId, PurchaseId};
