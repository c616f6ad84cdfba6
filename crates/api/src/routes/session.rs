//! Session issue and logout.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use serde_json::{Map, Value, json};
use store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /jwt: sign a session for the posted identity and set it as a cookie.
#[tracing::instrument(skip_all)]
pub async fn issue<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(identity): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.sessions.issue(identity)?;
    let cookie = state.sessions.session_cookie(token);

    metrics::counter!("sessions_issued_total").increment(1);
    tracing::info!("session issued");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(json!({ "success": true })),
    ))
}

/// GET /logout: clear the session cookie.
pub async fn logout<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let cookie = state.sessions.removal_cookie();
    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(json!({ "success": true })),
    )
}
