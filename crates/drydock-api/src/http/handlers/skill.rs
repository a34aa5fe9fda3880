//! Skill catalogue and skill level handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use drydock_types::character::{Character, SkillLevel, SkillRow};
use drydock_types::gamedata::{ItemGroup, ItemType, ItemTypeId};

use crate::http::error::AppError;
use crate::http::handlers::resolve;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetLevelRequest {
    /// 0-5; anything else (or null) marks the skill not learned.
    pub level: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SkillLevelView {
    pub skill_id: ItemTypeId,
    pub level: SkillLevel,
}

#[derive(Debug, Serialize)]
pub struct DescriptionView {
    pub id: i64,
    pub description: String,
}

/// GET /api/v1/skill-groups
pub async fn list_skill_groups(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ItemGroup>>>, AppError> {
    let start = Instant::now();
    let groups = state.character_service.skill_groups().await?;
    Ok(Json(ApiResponse::timed(groups, start)))
}

/// GET /api/v1/skill-groups/{group_id}/skills
pub async fn list_group_skills(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ItemType>>>, AppError> {
    let start = Instant::now();
    let skills = state.character_service.skills(group_id).await?;
    Ok(Json(ApiResponse::timed(skills, start)))
}

/// GET /api/v1/items/{item_id}/description
pub async fn get_item_description(
    State(state): State<AppState>,
    Path(item_id): Path<ItemTypeId>,
) -> Result<Json<ApiResponse<DescriptionView>>, AppError> {
    let start = Instant::now();
    let description = state.character_service.skill_description(item_id).await?;
    Ok(Json(ApiResponse::timed(
        DescriptionView {
            id: item_id,
            description,
        },
        start,
    )))
}

/// GET /api/v1/market-groups/{group_id}/description
pub async fn get_market_group_description(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<ApiResponse<DescriptionView>>, AppError> {
    let start = Instant::now();
    let description = state.character_service.group_description(group_id).await?;
    Ok(Json(ApiResponse::timed(
        DescriptionView {
            id: group_id,
            description,
        },
        start,
    )))
}

/// GET /api/v1/characters/{id}/skills/{skill_id}
pub async fn get_skill_level(
    State(state): State<AppState>,
    Path((reference, skill_id)): Path<(String, ItemTypeId)>,
) -> Result<Json<ApiResponse<SkillLevelView>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let level = state.character_service.skill_level(&id, skill_id).await?;
    Ok(Json(ApiResponse::timed(
        SkillLevelView { skill_id, level },
        start,
    )))
}

/// PUT /api/v1/characters/{id}/skills/{skill_id} - Pending until saved.
pub async fn set_skill_level(
    State(state): State<AppState>,
    Path((reference, skill_id)): Path<(String, ItemTypeId)>,
    Json(body): Json<SetLevelRequest>,
) -> Result<Json<ApiResponse<SkillLevelView>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let level = state
        .character_service
        .change_level(&id, skill_id, body.level)
        .await?;
    Ok(Json(
        ApiResponse::timed(SkillLevelView { skill_id, level }, start)
            .with_link("save", &format!("/api/v1/characters/{id}/save")),
    ))
}

/// PUT /api/v1/characters/{id}/skills - Replace every skill with a sheet and save.
pub async fn replace_skills(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(rows): Json<Vec<SkillRow>>,
) -> Result<Json<ApiResponse<Character>>, AppError> {
    let start = Instant::now();
    let id = resolve(&state, &reference).await?;
    let character = state
        .character_service
        .api_update_char_sheet(&id, &rows)
        .await?;
    Ok(Json(ApiResponse::timed(character, start)))
}
