//! Checkout coordinator for the purchase saga.

use chrono::Utc;
use common::{PlantId, PurchaseId};
use domain::{CatalogService, PurchaseRecorder, price_purchase, validate_purchase};
use rust_decimal::Decimal;
use serde::Serialize;
use store::{NewPurchase, PlantStore, PurchaseStore};

use crate::error::{CheckoutError, Result};
use crate::steps::CheckoutStep;

/// What a successful checkout produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    #[serde(rename = "insertedId")]
    pub purchase_id: PurchaseId,
    pub plant_id: PlantId,
    pub quantity: u32,
    /// Total charged for the purchase.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Stock left on the plant right after this checkout.
    pub remaining_quantity: u32,
}

/// Orchestrates checkouts: reserve stock, then record the purchase.
///
/// The reservation is a guarded decrement, so concurrent checkouts for the
/// same plant can never sell more than is in stock. If recording fails, the
/// reserved quantity is put back before the error is returned. Recording is
/// the last step, so the reservation is the only thing ever compensated.
pub struct CheckoutCoordinator<S>
where
    S: PlantStore + PurchaseStore,
{
    catalog: CatalogService<S>,
    purchases: PurchaseRecorder<S>,
}

impl<S> CheckoutCoordinator<S>
where
    S: PlantStore + PurchaseStore + Clone,
{
    /// Creates a coordinator working against one store.
    pub fn new(store: S) -> Self {
        Self::from_services(CatalogService::new(store.clone()), PurchaseRecorder::new(store))
    }
}

impl<S> CheckoutCoordinator<S>
where
    S: PlantStore + PurchaseStore,
{
    /// Creates a coordinator from existing services.
    pub fn from_services(catalog: CatalogService<S>, purchases: PurchaseRecorder<S>) -> Self {
        Self { catalog, purchases }
    }

    /// Runs a checkout for the given request.
    ///
    /// On success the purchase is recorded and the stock is reduced by the
    /// purchased quantity. On failure neither change remains, unless the
    /// error is `CompensationFailed`.
    #[tracing::instrument(skip(self, request), fields(plant_id = %request.plant_id, quantity = request.quantity))]
    pub async fn checkout(&self, request: NewPurchase) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run_steps(request).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(
                    purchase_id = %receipt.purchase_id,
                    remaining = receipt.remaining_quantity,
                    duration,
                    "checkout completed"
                );
            }
            Err(err) if err.is_rejection() => {
                metrics::counter!("checkout_rejected").increment(1);
                tracing::info!(error = %err, duration, "checkout rejected");
            }
            Err(CheckoutError::StepFailed { .. }) => {
                metrics::counter!("checkout_compensated").increment(1);
            }
            Err(_) => {}
        }

        result
    }

    async fn run_steps(&self, request: NewPurchase) -> Result<CheckoutReceipt> {
        validate_purchase(&request)?;

        let plant_id = request.plant_id;
        let quantity = request.quantity;

        // 1. Reserve stock
        tracing::info!(step = %CheckoutStep::ReserveStock, "checkout step started");
        let plant = self.catalog.decrement_quantity(plant_id, quantity).await?;

        // 2. Record the purchase
        tracing::info!(step = %CheckoutStep::RecordPurchase, "checkout step started");
        let purchase = price_purchase(request, plant.price, Utc::now());
        let price = purchase.price;
        let purchase_id = match self.purchases.record_purchase(purchase).await {
            Ok(purchase_id) => purchase_id,
            Err(e) => {
                tracing::warn!(step = %CheckoutStep::RecordPurchase, error = %e, "checkout step failed");
                self.release_reservation(plant_id, quantity).await?;
                return Err(CheckoutError::StepFailed {
                    step: CheckoutStep::RecordPurchase,
                    reason: e.to_string(),
                });
            }
        };

        Ok(CheckoutReceipt {
            purchase_id,
            plant_id,
            quantity,
            price,
            remaining_quantity: plant.quantity,
        })
    }

    /// Puts reserved stock back after a later step failed.
    #[tracing::instrument(skip(self))]
    async fn release_reservation(&self, plant_id: PlantId, quantity: u32) -> Result<()> {
        match self.catalog.restore_quantity(plant_id, quantity).await {
            Ok(_) => {
                tracing::info!(step = %CheckoutStep::ReserveStock, "compensation step completed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(step = %CheckoutStep::ReserveStock, error = %e, "compensation step failed");
                metrics::counter!("checkout_compensation_failed").increment(1);
                Err(CheckoutError::CompensationFailed {
                    step: CheckoutStep::ReserveStock,
                    reason: e.to_string(),
                })
            }
        }
    }
}
