//! HTTP handlers, one module per resource.

pub mod plants;
pub mod purchases;
pub mod session;
pub mod system;
pub mod users;

use common::PlantId;

use crate::error::ApiError;

/// Parses a plant id taken from the request path.
pub(crate) fn parse_plant_id(id: &str) -> Result<PlantId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid plant id '{id}': {e}")))
}
