//! Domain error types.

use common::PlantId;
use rust_decimal::Decimal;
use store::StoreError;
use thiserror::Error;

/// A request that breaks a marketplace rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Plant name is required.
    #[error("Plant name is required")]
    EmptyName,

    /// Price cannot be negative.
    #[error("Invalid price: {price} (must not be negative)")]
    NegativePrice { price: Decimal },

    /// Quantity must be positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Email address is missing or malformed.
    #[error("Invalid email: '{0}'")]
    InvalidEmail(String),
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The plant does not exist.
    #[error("Plant not found: {0}")]
    PlantNotFound(PlantId),

    /// Not enough stock to cover the request.
    #[error("Insufficient stock for plant {plant_id}: requested {requested}, available {available}")]
    InsufficientStock {
        plant_id: PlantId,
        requested: u64,
        available: u32,
    },

    /// The stock level would exceed the representable maximum.
    #[error("Quantity overflow for plant {plant_id}")]
    QuantityOverflow { plant_id: PlantId },

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PlantNotFound(id) => DomainError::PlantNotFound(id),
            StoreError::InsufficientStock {
                plant_id,
                requested,
                available,
            } => DomainError::InsufficientStock {
                plant_id,
                requested,
                available,
            },
            StoreError::QuantityOverflow { plant_id, .. } => {
                DomainError::QuantityOverflow { plant_id }
            }
            other => DomainError::Store(other),
        }
    }
}

/// Checks the shape of an email address: one `@` with text on both sides.
pub(crate) fn validate_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}
