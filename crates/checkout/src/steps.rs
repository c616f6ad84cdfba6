//! Checkout saga steps.

use serde::{Deserialize, Serialize};

/// A step of the checkout saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Take the purchased quantity out of the plant's stock.
    ReserveStock,
    /// Write the purchase record.
    RecordPurchase,
}

impl CheckoutStep {
    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::ReserveStock => "reserve_stock",
            CheckoutStep::RecordPurchase => "record_purchase",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
