//! Plant catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::PlantId;
use serde::{Deserialize, Serialize};
use store::{NewPlant, Plant, PlantUpdate, Store};

use super::parse_plant_id;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Body of `PATCH /plants/quantity/:id`. The amount is taken out of stock;
/// a negative amount puts stock back.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUpdate {
    pub quantity_update: i64,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantCreatedResponse {
    pub inserted_id: PlantId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

// -- Handlers --

/// POST /plants: list a new plant.
///
/// The plant must be listed under the caller's own email.
#[tracing::instrument(skip(state, user, plant), fields(caller = %user.email))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Json(plant): Json<NewPlant>,
) -> Result<(StatusCode, Json<PlantCreatedResponse>), ApiError> {
    if plant.seller.email != user.email {
        return Err(ApiError::Forbidden(
            "plants can only be listed under your own email".to_string(),
        ));
    }
    let inserted_id = state.catalog.create_plant(plant).await?;
    Ok((StatusCode::CREATED, Json(PlantCreatedResponse { inserted_id })))
}

/// GET /plants: list plants, capped.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Plant>>, ApiError> {
    Ok(Json(state.catalog.list_plants(query.limit).await?))
}

/// GET /plants/seller: plants listed by the caller.
#[tracing::instrument(skip(state, user), fields(caller = %user.email))]
pub async fn list_mine<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
) -> Result<Json<Vec<Plant>>, ApiError> {
    Ok(Json(state.catalog.list_plants_by_seller(&user.email).await?))
}

/// GET /plants/:id: a single plant, or `null` when it does not exist.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Plant>>, ApiError> {
    let id = parse_plant_id(&id)?;
    Ok(Json(state.catalog.get_plant(id).await?))
}

/// PUT /plants/:id: replace a plant's editable fields.
#[tracing::instrument(skip(state, user, update), fields(caller = %user.email))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<PlantUpdate>,
) -> Result<Json<Plant>, ApiError> {
    let id = parse_plant_id(&id)?;
    ensure_seller(&state, id, &user).await?;
    Ok(Json(state.catalog.update_plant(id, update).await?))
}

/// DELETE /plants/:id: remove a plant. Deleting twice is not an error.
#[tracing::instrument(skip(state, user), fields(caller = %user.email))]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_plant_id(&id)?;
    ensure_seller(&state, id, &user).await?;
    let deleted = state.catalog.delete_plant(id).await?;
    Ok(Json(DeleteResponse {
        deleted_count: u64::from(deleted),
    }))
}

/// PATCH /plants/quantity/:id: take `quantityUpdate` out of stock.
///
/// Rejected with 409 when the stock would go below zero, and with 400 when
/// it would go past the largest quantity a plant can hold.
#[tracing::instrument(skip(state, user, body), fields(caller = %user.email, amount = body.quantity_update))]
pub async fn adjust_quantity<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<QuantityUpdate>,
) -> Result<Json<Plant>, ApiError> {
    let id = parse_plant_id(&id)?;
    ensure_seller(&state, id, &user).await?;
    let delta = body
        .quantity_update
        .checked_neg()
        .ok_or_else(|| ApiError::BadRequest("quantityUpdate is out of range".to_string()))?;
    Ok(Json(state.catalog.adjust_quantity(id, delta).await?))
}

/// Fails with 403 unless the caller is the plant's seller.
///
/// A missing plant passes, so the mutation itself reports it the usual way.
async fn ensure_seller<S: Store + Clone + 'static>(
    state: &AppState<S>,
    id: PlantId,
    user: &AuthUser,
) -> Result<(), ApiError> {
    match state.catalog.get_plant(id).await? {
        Some(plant) if plant.seller.email != user.email => {
            tracing::info!(%id, seller = %plant.seller.email, "plant change refused");
            Err(ApiError::Forbidden(format!("plant {id} belongs to another seller")))
        }
        _ => Ok(()),
    }
}
