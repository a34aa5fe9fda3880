//! Character repository trait definition.

use drydock_types::character::{ApiSettings, Character, CharacterId, CharacterKind};
use drydock_types::error::RepositoryError;

/// Repository trait for character persistence.
///
/// Implementations live in drydock-infra (e.g., SqliteCharacterRepository).
/// A stored character is written and read as a whole: skills, implants and
/// API settings travel with it.
pub trait CharacterRepository: Send + Sync {
    /// Insert a new character. Returns the stored character.
    fn create(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    /// Get a character by its unique ID.
    fn get_by_id(
        &self,
        id: &CharacterId,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// Get the oldest character with exactly this name.
    fn get_by_name(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// Get the built-in character of the given kind.
    fn get_builtin(
        &self,
        kind: CharacterKind,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// List every character, built-ins first, then by name.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Character>, RepositoryError>> + Send;

    /// Replace a stored character (name, skills, implants, API settings).
    fn update(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    /// Replace only the API settings of a stored character.
    fn update_api_settings(
        &self,
        id: &CharacterId,
        settings: &ApiSettings,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Permanently delete a character by ID.
    fn delete(
        &self,
        id: &CharacterId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
