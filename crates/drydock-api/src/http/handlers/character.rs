//! Character lifecycle handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use drydock_types::character::{Character, CharacterSummary, CreateCharacterRequest};

use crate::http::error::AppError;
use crate::http::extractors::query::CharacterListQuery;
use crate::http::handlers::resolve;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

fn with_character_links(resp: ApiResponse<Character>) -> ApiResponse<Character> {
    let Some(id) = resp.data.as_ref().map(|c| c.id.to_string()) else {
        return resp;
    };
    resp.with_link("self", &format!("/api/v1/characters/{id}"))
        .with_link("implants", &format!("/api/v1/characters/{id}/implants"))
        .with_link("api", &format!("/api/v1/characters/{id}/api"))
}

/// GET /api/v1/characters - Built-ins first, then custom characters by name.
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<CharacterListQuery>,
) -> Result<Json<ApiResponse<Vec<CharacterSummary>>>, AppError> {
    let start = Instant::now();

    let active = match &query.active {
        Some(reference) => Some(resolve(&state, reference).await?),
        None => None,
    };
    let summaries = state
        .character_service
        .character_list(active.as_ref())
        .await?;

    Ok(Json(ApiResponse::timed(summaries, start)))
}

/// POST /api/v1/characters - Create a character (named "New Character" by default).
pub async fn create_character(
    State(state): State<AppState>,
    Json(body): Json<CreateCharacterRequest>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();

    let service = &state.character_service;
    let character = match body.name {
        Some(name) => service.create_named(&name).await?,
        None => service.new_character().await?,
    };

    Ok(Json(with_character_links(ApiResponse::timed(character, start))))
}

/// GET /api/v1/characters/{id} - Current view, pending edits included.
pub async fn get_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let character = state.character_service.resolve_character(&reference).await?;
    Ok(Json(with_character_links(ApiResponse::timed(character, start))))
}

/// PATCH /api/v1/characters/{id} - Rename.
pub async fn rename_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let character = state.character_service.rename(&id, &body.name).await?;
    Ok(Json(with_character_links(ApiResponse::timed(character, start))))
}

/// DELETE /api/v1/characters/{id}
pub async fn delete_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    state.character_service.delete(&id).await?;
    Ok(Json(ApiResponse::timed(
        serde_json::json!({"deleted": true, "id": id}),
        start,
    )))
}

/// POST /api/v1/characters/{id}/copy
pub async fn copy_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let copy = state.character_service.copy(&id).await?;
    Ok(Json(with_character_links(ApiResponse::timed(copy, start))))
}

/// POST /api/v1/characters/{id}/save - Persist pending edits.
pub async fn save_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let saved = state.character_service.save_character(&id).await?;
    Ok(Json(with_character_links(ApiResponse::timed(saved, start))))
}

/// POST /api/v1/characters/{id}/revert - Drop pending edits.
pub async fn revert_character(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let reverted = state.character_service.revert_character(&id).await?;
    Ok(Json(with_character_links(ApiResponse::timed(reverted, start))))
}
