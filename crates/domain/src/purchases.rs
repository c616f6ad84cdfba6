//! Purchase recording and customer purchase history.

use chrono::{DateTime, Utc};
use common::PurchaseId;
use rust_decimal::Decimal;
use store::{NewPurchase, Purchase, PurchaseDetails, PurchaseStore};

use crate::error::{DomainError, ValidationError, validate_email};

/// Turns a checkout request into a purchase record priced at `unit_price`.
pub fn price_purchase(request: NewPurchase, unit_price: Decimal, at: DateTime<Utc>) -> Purchase {
    Purchase {
        id: PurchaseId::new(),
        plant_id: request.plant_id,
        price: unit_price * Decimal::from(request.quantity),
        quantity: request.quantity,
        customer: request.customer,
        address: request.address,
        created_at: at,
    }
}

/// Validates a checkout request before any write happens.
pub fn validate_purchase(request: &NewPurchase) -> Result<(), ValidationError> {
    check_purchase(request.quantity, &request.customer.email)
}

fn check_purchase(quantity: u32, email: &str) -> Result<(), ValidationError> {
    if quantity == 0 {
        return Err(ValidationError::InvalidQuantity { quantity });
    }
    validate_email(email)
}

/// Service for writing and reading purchase records.
///
/// Recording a purchase never touches stock; the checkout flow pairs it
/// with the catalog's decrement.
#[derive(Clone)]
pub struct PurchaseRecorder<S: PurchaseStore> {
    store: S,
}

impl<S: PurchaseStore> PurchaseRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a purchase record and returns its id.
    #[tracing::instrument(skip(self, purchase), fields(plant_id = %purchase.plant_id, quantity = purchase.quantity))]
    pub async fn record_purchase(&self, purchase: Purchase) -> Result<PurchaseId, DomainError> {
        check_purchase(purchase.quantity, &purchase.customer.email)?;

        let id = self.store.insert_purchase(purchase).await?;
        tracing::info!(%id, "purchase recorded");
        Ok(id)
    }

    /// Returns a customer's purchases, oldest first, annotated with the
    /// current name, image and category of each plant.
    ///
    /// Purchases of plants that have since been deleted are left out.
    #[tracing::instrument(skip(self))]
    pub async fn list_purchases_for_customer(
        &self,
        email: &str,
    ) -> Result<Vec<PurchaseDetails>, DomainError> {
        Ok(self.store.purchases_for_customer(email).await?)
    }
}
