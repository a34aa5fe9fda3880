//! Catalogue loading and character file import handlers.

use std::path::PathBuf;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use drydock_core::service::character::ImportReport;
use drydock_types::gamedata::{GameDataBundle, GameDataImportSummary};

use crate::http::error::AppError;
use crate::http::handlers::validate_file_name;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Bare names of character files in the server's `imports/` folder.
    pub files: Vec<String>,
}

/// POST /api/v1/catalog - Load a game-data bundle.
pub async fn import_catalog(
    State(state): State<AppState>,
    Json(bundle): Json<GameDataBundle>,
) -> Result<Json<ApiResponse<GameDataImportSummary>>, AppError> {
    let start = Instant::now();
    let summary = state.character_service.import_catalog(&bundle).await?;
    Ok(Json(ApiResponse::timed(summary, start)))
}

/// POST /api/v1/characters/import - Import EVEMon or XML API character files
/// dropped into the `imports/` folder of the data directory.
///
/// Unreadable files are listed under `skipped`; the request itself succeeds.
pub async fn import_characters(
    State(state): State<AppState>,
    Json(body): Json<ImportRequest>,
) -> Result<Json<ApiResponse<ImportReport>>, AppError> {
    let start = Instant::now();
    if body.files.is_empty() {
        return Err(AppError::Validation("files must not be empty".to_string()));
    }
    let imports_dir = state.imports_dir();
    let paths = body
        .files
        .iter()
        .map(|name| validate_file_name(name).map(|name| imports_dir.join(name)))
        .collect::<Result<Vec<PathBuf>, AppError>>()?;
    let report = state
        .character_service
        .spawn_import(paths)
        .await
        .map_err(|e| AppError::Internal(format!("import task failed: {e}")))?;
    Ok(Json(ApiResponse::timed(report, start)
        .with_link("characters", "/api/v1/characters")))
}
