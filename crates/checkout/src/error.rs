//! Checkout error types.

use common::PlantId;
use domain::{DomainError, ValidationError};
use thiserror::Error;

use crate::steps::CheckoutStep;

/// Errors that can occur during a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request failed validation; nothing was written.
    #[error("Invalid checkout: {0}")]
    Invalid(#[from] ValidationError),

    /// The plant does not exist; nothing was written.
    #[error("Plant not found: {0}")]
    PlantNotFound(PlantId),

    /// Not enough stock; nothing was written.
    #[error(
        "Insufficient stock for plant {plant_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        plant_id: PlantId,
        requested: u64,
        available: u32,
    },

    /// A step failed and every completed step was undone.
    #[error("Checkout step '{step}' failed: {reason}")]
    StepFailed { step: CheckoutStep, reason: String },

    /// A step failed and undoing an earlier step failed too.
    #[error("Compensation step '{step}' failed: {reason}")]
    CompensationFailed { step: CheckoutStep, reason: String },

    /// Unexpected domain error.
    #[error("Domain error: {0}")]
    Domain(DomainError),
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(e) => CheckoutError::Invalid(e),
            DomainError::PlantNotFound(id) => CheckoutError::PlantNotFound(id),
            DomainError::InsufficientStock {
                plant_id,
                requested,
                available,
            } => CheckoutError::InsufficientStock {
                plant_id,
                requested,
                available,
            },
            other => CheckoutError::Domain(other),
        }
    }
}

impl CheckoutError {
    /// Returns true if the checkout was turned away before any write.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CheckoutError::Invalid(_)
                | CheckoutError::PlantNotFound(_)
                | CheckoutError::InsufficientStock { .. }
        )
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
