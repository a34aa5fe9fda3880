//! Requirement check and skill plan handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use drydock_types::character::CharacterId;
use drydock_types::fit::FitLoadout;
use drydock_types::plan::{ExportFormat, SkillPlan};
use drydock_types::requirement::ItemRequirements;

use crate::http::error::AppError;
use crate::http::handlers::{resolve, validate_file_name};
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequirementsRequest {
    pub fit: FitLoadout,
    /// Character ID or name. Absent means every requirement is unmet.
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BackupRequest {
    pub fit: FitLoadout,
    #[serde(default)]
    pub character: Option<String>,
    /// Defaults to the configured export format.
    #[serde(default)]
    pub format: Option<ExportFormat>,
    /// Plain file name, written under the data directory's `plans/`.
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct BackupView {
    pub path: String,
    pub format: ExportFormat,
    pub entries: usize,
}

async fn character_id(
    state: &AppState,
    reference: Option<&str>,
) -> Result<Option<CharacterId>, AppError> {
    match reference {
        Some(reference) => Ok(Some(resolve(state, reference).await?)),
        None => Ok(None),
    }
}

/// POST /api/v1/requirements - Missing-skill trees per fitted item.
pub async fn check_requirements(
    State(state): State<AppState>,
    Json(body): Json<RequirementsRequest>,
) -> Result<Json<ApiResponse<Vec<ItemRequirements>>>, AppError> {
    let start = Instant::now();
    let character = character_id(&state, body.character.as_deref()).await?;
    let requirements = state
        .character_service
        .check_requirements(&body.fit, character.as_ref())
        .await?;
    Ok(Json(ApiResponse::timed(requirements, start)))
}

/// POST /api/v1/requirements/plan - Requirement trees flattened into a plan.
pub async fn skill_plan(
    State(state): State<AppState>,
    Json(body): Json<RequirementsRequest>,
) -> Result<Json<ApiResponse<SkillPlan>>, AppError> {
    let start = Instant::now();
    let character = character_id(&state, body.character.as_deref()).await?;
    let plan = state
        .character_service
        .skill_plan(&body.fit, character.as_ref())
        .await?;
    Ok(Json(ApiResponse::timed(plan, start)))
}

/// POST /api/v1/requirements/backup - Write the plan to `plans/{file_name}`.
pub async fn backup_plan(
    State(state): State<AppState>,
    Json(body): Json<BackupRequest>,
) -> Result<Json<ApiResponse<BackupView>>, AppError> {
    let start = Instant::now();
    let file_name = validate_file_name(&body.file_name)?;
    let format = body.format.unwrap_or(state.config.default_export_format);

    let character = character_id(&state, body.character.as_deref()).await?;
    let plan = state
        .character_service
        .skill_plan(&body.fit, character.as_ref())
        .await?;
    let entries = plan.entries.len();

    let path = state.plans_dir().join(file_name);
    state
        .character_service
        .backup_skills(path.clone(), format, plan)
        .await
        .map_err(|e| AppError::Internal(format!("backup task failed: {e}")))??;

    Ok(Json(ApiResponse::timed(
        BackupView {
            path: path.display().to_string(),
            format,
            entries,
        },
        start,
    )))
}
