//! HTTP request handlers for the REST API.

pub mod catalog;
pub mod character;
pub mod eveapi;
pub mod implant;
pub mod requirements;
pub mod skill;

use drydock_types::character::CharacterId;

use crate::http::error::AppError;
use crate::state::AppState;

/// Resolve a path segment (UUID or exact name) to a character ID.
pub(crate) async fn resolve(state: &AppState, reference: &str) -> Result<CharacterId, AppError> {
    Ok(state
        .character_service
        .resolve_character(reference)
        .await?
        .id)
}

/// Reject anything but a bare file name, so server-side files stay inside
/// the directory the endpoint owns.
pub(crate) fn validate_file_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(AppError::Validation(format!("invalid file name: '{name}'")));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert_eq!(validate_file_name(" rifter.emp ").unwrap(), "rifter.emp");
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../escape.emp").is_err());
        assert!(validate_file_name("/etc/passwd").is_err());
        assert!(validate_file_name("dir/plan.txt").is_err());
        assert!(validate_file_name("dir\\plan.txt").is_err());
        assert!(validate_file_name(".hidden").is_err());
    }
}
