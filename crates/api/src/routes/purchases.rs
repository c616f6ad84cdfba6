//! Checkout and purchase history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::CheckoutReceipt;
use store::{NewPurchase, PurchaseDetails, Store};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /purchases: check out: reserve stock and record the purchase.
#[tracing::instrument(skip(state, user, request), fields(caller = %user.email))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Json(request): Json<NewPurchase>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), ApiError> {
    let receipt = state.checkout.checkout(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /purchases/:email: a customer's purchases with plant details.
#[tracing::instrument(skip(state, user), fields(caller = %user.email))]
pub async fn list_for_customer<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Vec<PurchaseDetails>>, ApiError> {
    Ok(Json(
        state.purchases.list_purchases_for_customer(&email).await?,
    ))
}
