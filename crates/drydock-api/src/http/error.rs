//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use drydock_types::error::{ApiError, CharacterError, GameDataError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Character(CharacterError),
    /// Malformed request input.
    Validation(String),
    NotFound(String),
    Internal(String),
}

impl From<CharacterError> for AppError {
    fn from(e: CharacterError) -> Self {
        AppError::Character(e)
    }
}

impl AppError {
    /// Machine-readable code and message for the error envelope.
    pub fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Character(e) => match e {
                CharacterError::NotFound => ("CHARACTER_NOT_FOUND", "Character not found".to_string()),
                CharacterError::ReadOnly(_) => ("READ_ONLY", e.to_string()),
                CharacterError::InvalidName(_) => ("VALIDATION_ERROR", e.to_string()),
                CharacterError::NotAnImplant(_) => ("NOT_AN_IMPLANT", e.to_string()),
                CharacterError::GameData(
                    GameDataError::ItemNotFound(_) | GameDataError::MarketGroupNotFound(_),
                ) => ("ITEM_NOT_FOUND", e.to_string()),
                CharacterError::GameData(GameDataError::GroupNotFound(_)) => {
                    ("GROUP_NOT_FOUND", e.to_string())
                }
                CharacterError::Api(ApiError::MissingCredentials) => {
                    ("API_CREDENTIALS_MISSING", e.to_string())
                }
                CharacterError::Api(_) => ("API_ERROR", e.to_string()),
                CharacterError::FileSystemError(_) => ("FILESYSTEM_ERROR", e.to_string()),
                _ => ("STORAGE_ERROR", e.to_string()),
            },
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        if code == "STORAGE_ERROR" || code == "INTERNAL_ERROR" || code == "FILESYSTEM_ERROR" {
            tracing::error!(code, %message, "request failed");
        }
        ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;

    #[test]
    fn test_character_errors_map_to_codes() {
        let cases = [
            (CharacterError::NotFound, "CHARACTER_NOT_FOUND", StatusCode::NOT_FOUND),
            (
                CharacterError::ReadOnly("All 5".into()),
                "READ_ONLY",
                StatusCode::FORBIDDEN,
            ),
            (
                CharacterError::InvalidName("empty".into()),
                "VALIDATION_ERROR",
                StatusCode::BAD_REQUEST,
            ),
            (
                CharacterError::GameData(GameDataError::ItemNotFound(1)),
                "ITEM_NOT_FOUND",
                StatusCode::NOT_FOUND,
            ),
            (
                CharacterError::Api(ApiError::Transport("timeout".into())),
                "API_ERROR",
                StatusCode::BAD_GATEWAY,
            ),
            (
                CharacterError::StorageError("locked".into()),
                "STORAGE_ERROR",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, code, status) in cases {
            let error = AppError::from(error);
            assert_eq!(error.code_and_message().0, code);
            assert_eq!(error.into_response().status(), status);
        }
    }
}
