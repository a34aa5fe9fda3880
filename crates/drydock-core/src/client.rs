//! Port for the game-data XML API.

use std::future::Future;

use secrecy::SecretString;

use drydock_types::error::ApiError;

use crate::import::{ApiCharacter, CharacterSheet};

/// Read-only access to an account on the game-data API.
///
/// Implementations live in drydock-infra. The verification code is passed as
/// a [`SecretString`] and must not be logged.
pub trait EveApiClient: Send + Sync {
    /// Characters on the account identified by `key_id`.
    fn account_characters(
        &self,
        key_id: &str,
        v_code: &SecretString,
    ) -> impl Future<Output = Result<Vec<ApiCharacter>, ApiError>> + Send;

    /// Skill sheet of one character on the account.
    fn character_sheet(
        &self,
        key_id: &str,
        v_code: &SecretString,
        character_id: i64,
    ) -> impl Future<Output = Result<CharacterSheet, ApiError>> + Send;
}
