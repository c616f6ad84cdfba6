//! HTTP API server for the plant nursery marketplace.
//!
//! Provides REST endpoints for the plant catalog, checkout and purchase
//! history, user records and cookie sessions, with structured logging
//! (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::system::greet))
        .route("/health", get(routes::system::health))
        .route("/users/{email}", post(routes::users::save::<S>))
        .route("/users/role/{email}", get(routes::users::role::<S>))
        .route("/jwt", post(routes::session::issue::<S>))
        .route("/logout", get(routes::session::logout::<S>))
        .route(
            "/plants",
            post(routes::plants::create::<S>).get(routes::plants::list::<S>),
        )
        .route("/plants/seller", get(routes::plants::list_mine::<S>))
        .route(
            "/plants/{id}",
            get(routes::plants::get::<S>)
                .put(routes::plants::update::<S>)
                .delete(routes::plants::delete::<S>),
        )
        .route(
            "/plants/quantity/{id}",
            patch(routes::plants::adjust_quantity::<S>),
        )
        .route("/purchases", post(routes::purchases::create::<S>))
        .route(
            "/purchases/{email}",
            get(routes::purchases::list_for_customer::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(&config.client_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured client origins, with cookies allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
