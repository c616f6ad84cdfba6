//! Shared application state.

use std::sync::Arc;

use checkout::CheckoutCoordinator;
use domain::{CatalogService, PurchaseRecorder, UserService};
use store::Store;

use crate::auth::SessionKeys;
use crate::config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub catalog: CatalogService<S>,
    pub purchases: PurchaseRecorder<S>,
    pub users: UserService<S>,
    pub checkout: CheckoutCoordinator<S>,
    pub sessions: SessionKeys,
}

impl<S: Store + Clone> AppState<S> {
    /// Wires every service to the same store.
    pub fn new(store: S, config: &Config) -> Arc<Self> {
        let catalog = CatalogService::with_list_cap(store.clone(), config.plant_list_cap);
        let purchases = PurchaseRecorder::new(store.clone());
        let checkout = CheckoutCoordinator::from_services(catalog.clone(), purchases.clone());

        Arc::new(Self {
            catalog,
            purchases,
            users: UserService::new(store),
            checkout,
            sessions: SessionKeys::new(
                config.token_secret.as_bytes(),
                chrono::Duration::days(i64::from(config.session_ttl_days)),
                config.production,
            ),
        })
    }
}
