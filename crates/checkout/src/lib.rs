//! Checkout flow for plant purchases.
//!
//! A checkout touches two records that must agree: the plant's stock and
//! the purchase log. It runs as a short saga:
//! 1. Reserve stock (guarded decrement, fails without writing when short)
//! 2. Record the purchase
//!
//! If a step fails, previously completed steps are compensated in reverse order.

pub mod coordinator;
pub mod error;
pub mod steps;

pub use coordinator::{CheckoutCoordinator, CheckoutReceipt};
pub use error::CheckoutError;
pub use steps::CheckoutStep;
