use thiserror::Error;

/// Errors related to character operations.
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("character not found")]
    NotFound,

    #[error("character '{0}' is built-in and cannot be modified")]
    ReadOnly(String),

    #[error("invalid character name: {0}")]
    InvalidName(String),

    #[error("item {0} is not an implant")]
    NotAnImplant(i64),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("game data error: {0}")]
    GameData(#[from] GameDataError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("filesystem error: {0}")]
    FileSystemError(String),

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// Errors from the static game-data catalogue.
#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("item {0} not found")]
    ItemNotFound(i64),

    #[error("group {0} not found")]
    GroupNotFound(i64),

    #[error("market group {0} not found")]
    MarketGroupNotFound(i64),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors while reading a character or API document.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unrecognized document: {0}")]
    UnrecognizedFormat(String),

    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("invalid attribute '{name}': {value}")]
    InvalidAttribute { name: &'static str, value: String },
}

/// Errors from the game-data XML API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no API credentials configured")]
    MissingCredentials,

    #[error("API returned error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Response(#[from] ImportError),
}

/// Errors from repository operations (used by trait definitions in drydock-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
