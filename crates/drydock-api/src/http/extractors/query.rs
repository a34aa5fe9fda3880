//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Query parameters for the character list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct CharacterListQuery {
    /// Character (ID or name) to flag as active in the listing.
    pub active: Option<String>,
}
