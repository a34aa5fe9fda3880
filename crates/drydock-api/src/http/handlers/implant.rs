//! Implant handlers. Changes are pending until the character is saved.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use drydock_types::character::Implant;
use drydock_types::gamedata::ItemTypeId;

use crate::http::error::AppError;
use crate::http::handlers::resolve;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddImplantRequest {
    pub item_id: ItemTypeId,
}

/// GET /api/v1/characters/{id}/implants
pub async fn list_implants(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Vec<Implant>>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let implants = state.character_service.implants(&id).await?;
    Ok(Json(ApiResponse::timed(implants, start)))
}

/// POST /api/v1/characters/{id}/implants
pub async fn add_implant(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(body): Json<AddImplantRequest>,
) -> Result<Json<ApiResponse<Implant>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let implant = state.character_service.add_implant(&id, body.item_id).await?;
    Ok(Json(ApiResponse::timed(implant, start)))
}

/// DELETE /api/v1/characters/{id}/implants/{slot}
///
/// `data` is the unplugged implant, or null when the slot was empty.
pub async fn remove_implant(
    State(state): State<AppState>,
    Path((reference, slot)): Path<(String, u8)>,
) -> Result<Json<ApiResponse<Option<Implant>>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let removed = state.character_service.remove_implant(&id, slot).await?;
    Ok(Json(ApiResponse::timed(removed, start)))
}
