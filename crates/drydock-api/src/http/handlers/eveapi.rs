//! XML API link handlers.
//!
//! The verification code is accepted on input but never echoed back.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use drydock_types::character::Character;

use crate::http::error::AppError;
use crate::http::handlers::resolve;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiDetailsView {
    pub key_id: String,
    pub has_v_code: bool,
    pub default_char: String,
    pub characters: Vec<String>,
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub key_id: String,
    pub v_code: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub name: String,
}

/// GET /api/v1/characters/{id}/api
pub async fn get_api_details(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<ApiDetailsView>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let details = state.character_service.api_details(&id).await?;
    Ok(Json(ApiResponse::timed(
        ApiDetailsView {
            key_id: details.key_id,
            has_v_code: !details.v_code.expose_secret().is_empty(),
            default_char: details.default_char,
            characters: details.characters,
        },
        start,
    )))
}

/// POST /api/v1/characters/{id}/api/characters - Store credentials, list account characters.
pub async fn list_api_characters(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    if body.key_id.trim().is_empty() {
        return Err(AppError::Validation("key_id must not be empty".to_string()));
    }
    let names = state
        .character_service
        .api_char_list(&id, body.key_id.trim(), SecretString::from(body.v_code))
        .await?;
    Ok(Json(ApiResponse::timed(names, start)))
}

/// POST /api/v1/characters/{id}/api/fetch - Replace skills with an account character's sheet.
pub async fn fetch_api_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(body): Json<FetchRequest>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let updated = state
        .character_service
        .api_fetch(&id, &body.name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("no character named '{}' on the API account", body.name))
        })?;
    Ok(Json(ApiResponse::timed(updated, start)))
}
