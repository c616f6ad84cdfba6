//! Service layer for the plant marketplace.
//!
//! This crate provides the validating services the HTTP layer talks to:
//! - `CatalogService` for plant listings and stock levels
//! - `PurchaseRecorder` for purchase records and customer history
//! - `UserService` for first-login user records and roles
//!
//! Every service is handed its store explicitly; none of them reach for
//! shared global state.

pub mod catalog;
pub mod error;
pub mod purchases;
pub mod users;

pub use catalog::{CatalogService, DEFAULT_LIST_CAP};
pub use error::{DomainError, ValidationError};
pub use purchases::{PurchaseRecorder, price_purchase, validate_purchase};
pub use users::UserService;
