//! User records and role lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use store::{NewUser, Role, Store, User};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// POST /users/:email: save a user on first login.
///
/// Answers 201 with the new record, or 200 with the existing one when the
/// email is already known.
#[tracing::instrument(skip(state, profile))]
pub async fn save<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
    Json(profile): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let saved = state.users.save_user(&email, profile).await?;
    let status = if saved.is_inserted() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(saved.into_inner())))
}

/// GET /users/role/:email: role lookup for client route guards.
#[tracing::instrument(skip(state))]
pub async fn role<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = state
        .users
        .get_role(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {email} not found")))?;
    Ok(Json(RoleResponse { role }))
}
