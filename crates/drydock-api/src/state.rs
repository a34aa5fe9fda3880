//! Application state shared by CLI commands and HTTP handlers.
//!
//! `AppState` is the composition root: it wires the SQLite repositories,
//! the XML API client, and the local filesystem into the generic
//! `CharacterService`.

use std::path::PathBuf;
use std::sync::Arc;

use drydock_core::service::character::CharacterService;
use drydock_infra::config::{load_app_config, request_timeout};
use drydock_infra::eveapi::XmlApiClient;
use drydock_infra::filesystem::{LocalFileSystem, resolve_data_dir};
use drydock_infra::sqlite::character::SqliteCharacterRepository;
use drydock_infra::sqlite::gamedata::SqliteGameDataRepository;
use drydock_infra::sqlite::pool::{DatabasePool, database_url};
use drydock_types::config::AppConfig;

/// Concrete type alias for the CharacterService wired to production adapters.
pub type ConcreteCharacterService = CharacterService<
    SqliteCharacterRepository,
    SqliteGameDataRepository,
    XmlApiClient,
    LocalFileSystem,
>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub character_service: Arc<ConcreteCharacterService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize state from the resolved data directory (`DRYDOCK_DATA_DIR` or `~/.drydock`).
    pub async fn init() -> anyhow::Result<Self> {
        Self::open(resolve_data_dir()).await
    }

    /// Initialize state rooted at `data_dir`, creating it if needed.
    pub async fn open(data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let api = XmlApiClient::new(config.api_base_url.clone(), request_timeout(&config))?;
        let character_service = CharacterService::new(
            SqliteCharacterRepository::new(db_pool.clone()),
            SqliteGameDataRepository::new(db_pool.clone()),
            api,
            LocalFileSystem::new(),
            config.evemon_revision.clone(),
        );

        tracing::debug!(data_dir = %data_dir.display(), "application state ready");

        Ok(Self {
            character_service: Arc::new(character_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
        })
    }

    /// Default location for plan backups when no path is given.
    pub fn plans_dir(&self) -> PathBuf {
        LocalFileSystem::plans_dir(&self.data_dir)
    }

    pub fn imports_dir(&self) -> PathBuf {
        LocalFileSystem::imports_dir(&self.data_dir)
    }
}
