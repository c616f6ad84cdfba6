use thiserror::Error;

use crate::PlantId;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The plant does not exist.
    #[error("Plant not found: {0}")]
    PlantNotFound(PlantId),

    /// A quantity change would take the stock below zero.
    #[error(
        "Insufficient stock for plant {plant_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        plant_id: PlantId,
        requested: u64,
        available: u32,
    },

    /// A quantity change would take the stock above the representable maximum.
    #[error("Quantity overflow for plant {plant_id}: cannot add {delta} to {available}")]
    QuantityOverflow {
        plant_id: PlantId,
        delta: i64,
        available: u32,
    },

    /// A stored row could not be turned back into a record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The store refused the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
