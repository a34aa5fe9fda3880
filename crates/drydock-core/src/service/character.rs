//! Character management service.
//!
//! Owns the character lifecycle (create, copy, rename, delete), skill and
//! implant editing, the API integration, requirement checks against a fit,
//! and the file import/backup jobs.
//!
//! Level and implant edits are kept in memory until the character is saved
//! or reverted. Everything else is written through immediately.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::task::JoinHandle;

use drydock_types::character::{
    Character, CharacterId, CharacterKind, CharacterSummary, Implant, MAX_SKILL_LEVEL,
    SkillLevel, SkillRow,
};
use drydock_types::error::{ApiError, CharacterError, GameDataError, RepositoryError};
use drydock_types::fit::FitLoadout;
use drydock_types::gamedata::{
    GameDataBundle, GameDataImportSummary, ItemGroup, ItemType, ItemTypeId, SKILL_CATEGORY_ID,
};
use drydock_types::plan::{ExportFormat, SkillPlan};
use drydock_types::requirement::ItemRequirements;

use crate::client::EveApiClient;
use crate::import::parse_character_file;
use crate::plan::render;
use crate::repository::character::CharacterRepository;
use crate::repository::gamedata::GameDataRepository;
use crate::requirement::{PrerequisiteGraph, check_requirements};
use crate::service::fs::FileSystem;

/// Name used in plans checked without a character.
const NO_CHARACTER: &str = "No character";

/// API settings of a character as shown to the user. Unset values are empty.
#[derive(Debug, Clone)]
pub struct ApiDetails {
    pub key_id: String,
    pub v_code: SecretString,
    pub default_char: String,
    pub characters: Vec<String>,
}

/// A file the import job could not turn into a character.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of an import job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: Vec<Character>,
    pub skipped: Vec<SkippedFile>,
}

/// Unsaved copy of a character. `revision` changes on every edit, so a save
/// can tell whether edits arrived while it was writing.
struct PendingEdit {
    character: Character,
    revision: u64,
}

fn storage(e: RepositoryError) -> CharacterError {
    match e {
        RepositoryError::NotFound => CharacterError::NotFound,
        other => CharacterError::StorageError(other.to_string()),
    }
}

fn catalogue(e: RepositoryError) -> CharacterError {
    CharacterError::GameData(GameDataError::StorageError(e.to_string()))
}

fn ensure_editable(character: &Character) -> Result<(), CharacterError> {
    if character.is_read_only() {
        Err(CharacterError::ReadOnly(character.name.clone()))
    } else {
        Ok(())
    }
}

/// Service orchestrating characters and their skills.
///
/// Generic over repository and infrastructure traits to maintain clean
/// architecture -- drydock-core never depends on drydock-infra.
pub struct CharacterService<C, G, A, F>
where
    C: CharacterRepository,
    G: GameDataRepository,
    A: EveApiClient,
    F: FileSystem,
{
    characters: C,
    game_data: G,
    api: A,
    fs: F,
    /// Unsaved level and implant edits, keyed by character.
    pending: DashMap<CharacterId, PendingEdit>,
    revisions: AtomicU64,
    evemon_revision: String,
}

impl<C, G, A, F> CharacterService<C, G, A, F>
where
    C: CharacterRepository,
    G: GameDataRepository,
    A: EveApiClient,
    F: FileSystem,
{
    /// Create a new CharacterService.
    ///
    /// - `characters`: persistence for character records
    /// - `game_data`: the static item catalogue
    /// - `api`: the game-data XML API
    /// - `fs`: file access for imports and plan backups
    /// - `evemon_revision`: revision stamped into exported EVEMon plans
    pub fn new(
        characters: C,
        game_data: G,
        api: A,
        fs: F,
        evemon_revision: impl Into<String>,
    ) -> Self {
        Self {
            characters,
            game_data,
            api,
            fs,
            pending: DashMap::new(),
            revisions: AtomicU64::new(0),
            evemon_revision: evemon_revision.into(),
        }
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    async fn builtin(&self, kind: CharacterKind) -> Result<Character, CharacterError> {
        self.characters
            .get_builtin(kind)
            .await
            .map_err(storage)?
            .ok_or(CharacterError::NotFound)
    }

    /// The built-in character with every skill at level 0.
    pub async fn all0(&self) -> Result<Character, CharacterError> {
        self.builtin(CharacterKind::AllZero).await
    }

    pub async fn all0_id(&self) -> Result<CharacterId, CharacterError> {
        Ok(self.all0().await?.id)
    }

    /// The built-in character with every skill at level 5.
    pub async fn all5(&self) -> Result<Character, CharacterError> {
        self.builtin(CharacterKind::AllFive).await
    }

    pub async fn all5_id(&self) -> Result<CharacterId, CharacterError> {
        Ok(self.all5().await?.id)
    }

    /// The character as last saved, ignoring pending edits.
    async fn stored(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        self.characters
            .get_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(CharacterError::NotFound)
    }

    /// Current view of a character, pending edits included.
    pub async fn get_character(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        if let Some(pending) = self.pending.get(id) {
            return Ok(pending.character.clone());
        }
        self.stored(id).await
    }

    /// Look a character up by ID, or by exact name when `reference` is not a UUID.
    pub async fn resolve_character(&self, reference: &str) -> Result<Character, CharacterError> {
        if let Ok(id) = reference.parse::<CharacterId>() {
            return self.get_character(&id).await;
        }
        let found = self
            .characters
            .get_by_name(reference)
            .await
            .map_err(storage)?
            .ok_or(CharacterError::NotFound)?;
        self.get_character(&found.id).await
    }

    /// Every character, built-ins first. Characters with unsaved edits get a
    /// trailing ` *` on their display name.
    pub async fn character_list(
        &self,
        active: Option<&CharacterId>,
    ) -> Result<Vec<CharacterSummary>, CharacterError> {
        let characters = self.characters.list().await.map_err(storage)?;
        Ok(characters
            .into_iter()
            .map(|character| {
                let dirty = self.pending.contains_key(&character.id);
                let display_name = if dirty {
                    format!("{} *", character.name)
                } else {
                    character.name.clone()
                };
                CharacterSummary {
                    active: active == Some(&character.id),
                    id: character.id,
                    display_name,
                    dirty,
                }
            })
            .collect())
    }

    pub async fn char_name(&self, id: &CharacterId) -> Result<String, CharacterError> {
        Ok(self.get_character(id).await?.name)
    }

    /// True when the character has unsaved edits.
    pub fn is_dirty(&self, id: &CharacterId) -> bool {
        self.pending.contains_key(id)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Create and persist a character with the default name.
    pub async fn new_character(&self) -> Result<Character, CharacterError> {
        self.create_named(Character::DEFAULT_NAME).await
    }

    /// Create and persist an empty character.
    pub async fn create_named(&self, name: &str) -> Result<Character, CharacterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CharacterError::InvalidName("name cannot be empty".to_string()));
        }
        let character = self
            .characters
            .create(&Character::new(name))
            .await
            .map_err(storage)?;
        tracing::info!(id = %character.id, name = %character.name, "created character");
        Ok(character)
    }

    /// Rename a character and save the new name.
    pub async fn rename(&self, id: &CharacterId, name: &str) -> Result<Character, CharacterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CharacterError::InvalidName("name cannot be empty".to_string()));
        }

        let mut character = self.stored(id).await?;
        ensure_editable(&character)?;
        character.name = name.to_string();
        character.updated_at = chrono::Utc::now();
        let character = self.characters.update(&character).await.map_err(storage)?;

        if let Some(mut pending) = self.pending.get_mut(id) {
            pending.character.name = character.name.clone();
        }
        tracing::info!(id = %id, name = %character.name, "renamed character");
        self.get_character(id).await
    }

    /// Deep copy of a character (skills, implants, API settings), saved under
    /// a new ID with ` copy` appended to the name.
    ///
    /// Copying a built-in materializes its level for every catalogue skill.
    pub async fn copy(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        let mut source = self.get_character(id).await?;

        let builtin_level = match source.kind {
            CharacterKind::Custom => None,
            CharacterKind::AllZero => Some(0),
            CharacterKind::AllFive => Some(MAX_SKILL_LEVEL),
        };
        if let Some(level) = builtin_level {
            let skills = self.game_data.skill_ids().await.map_err(catalogue)?;
            source.skills = skills.into_iter().map(|skill| (skill, level)).collect();
        }

        let copy = self
            .characters
            .create(&source.duplicate())
            .await
            .map_err(storage)?;
        tracing::info!(source = %id, id = %copy.id, name = %copy.name, "copied character");
        Ok(copy)
    }

    /// Delete a character and drop its pending edits.
    pub async fn delete(&self, id: &CharacterId) -> Result<(), CharacterError> {
        let character = self.stored(id).await?;
        ensure_editable(&character)?;
        self.characters.delete(id).await.map_err(storage)?;
        self.pending.remove(id);
        tracing::info!(id = %id, name = %character.name, "deleted character");
        Ok(())
    }

    /// Persist the pending edits of one character. Other characters' edits
    /// stay pending.
    ///
    /// The pending copy stays in place while the write runs. Edits made in
    /// the meantime keep it pending, on top of the levels just saved.
    pub async fn save_character(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        let snapshot = self
            .pending
            .get(id)
            .map(|pending| (pending.character.clone(), pending.revision));
        let Some((mut character, revision)) = snapshot else {
            return self.stored(id).await;
        };

        character.updated_at = chrono::Utc::now();
        let saved = self.characters.update(&character).await.map_err(storage)?;

        if self
            .pending
            .remove_if(id, |_, pending| pending.revision == revision)
            .is_none()
        {
            tracing::debug!(id = %id, "character edited during save, keeping later edits pending");
        } else {
            tracing::debug!(id = %id, "saved character");
        }
        Ok(saved)
    }

    /// Discard the pending edits of one character.
    pub async fn revert_character(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        if self.pending.remove(id).is_some() {
            tracing::debug!(id = %id, "reverted character");
        }
        self.stored(id).await
    }

    /// Apply an edit to the pending copy of a character, starting one from
    /// the stored character if needed.
    async fn edit<R>(
        &self,
        id: &CharacterId,
        change: impl FnOnce(&mut Character) -> R + Send,
    ) -> Result<R, CharacterError> {
        let revision = self.revisions.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(mut pending) = self.pending.get_mut(id) {
            pending.revision = revision;
            return Ok(change(&mut pending.character));
        }

        let character = self.stored(id).await?;
        ensure_editable(&character)?;
        let mut pending = self
            .pending
            .entry(id.clone())
            .or_insert(PendingEdit { character, revision });
        pending.revision = revision;
        Ok(change(&mut pending.character))
    }

    // ---------------------------------------------------------------------
    // Skills and implants
    // ---------------------------------------------------------------------

    /// Published skill groups, ordered by name.
    pub async fn skill_groups(&self) -> Result<Vec<ItemGroup>, CharacterError> {
        let groups = self
            .game_data
            .groups_in_category(SKILL_CATEGORY_ID)
            .await
            .map_err(catalogue)?;
        Ok(groups.into_iter().filter(|g| g.published).collect())
    }

    /// Published skills of a group, ordered by name.
    pub async fn skills(&self, group_id: i64) -> Result<Vec<ItemType>, CharacterError> {
        let group = self
            .game_data
            .get_group(group_id)
            .await
            .map_err(catalogue)?
            .ok_or(GameDataError::GroupNotFound(group_id))?;
        let items = self
            .game_data
            .items_in_group(group.id)
            .await
            .map_err(catalogue)?;
        Ok(items.into_iter().filter(|i| i.published).collect())
    }

    pub async fn skill_description(&self, item_id: ItemTypeId) -> Result<String, CharacterError> {
        let item = self
            .game_data
            .get_item(item_id)
            .await
            .map_err(catalogue)?
            .ok_or(GameDataError::ItemNotFound(item_id))?;
        Ok(item.description)
    }

    pub async fn group_description(&self, market_group_id: i64) -> Result<String, CharacterError> {
        let group = self
            .game_data
            .get_market_group(market_group_id)
            .await
            .map_err(catalogue)?
            .ok_or(GameDataError::MarketGroupNotFound(market_group_id))?;
        Ok(group.description)
    }

    pub async fn skill_level(
        &self,
        id: &CharacterId,
        skill: ItemTypeId,
    ) -> Result<SkillLevel, CharacterError> {
        Ok(self.get_character(id).await?.skill_level(skill))
    }

    /// Set a skill level as a pending edit. A level outside 0..=5, or none
    /// at all, marks the skill not learned.
    pub async fn change_level(
        &self,
        id: &CharacterId,
        skill: ItemTypeId,
        level: Option<i64>,
    ) -> Result<SkillLevel, CharacterError> {
        let level = SkillLevel::from_raw(level);
        self.edit(id, |character| character.set_skill_level(skill, level))
            .await?;
        tracing::debug!(id = %id, skill, %level, "changed skill level");
        Ok(level)
    }

    /// Plug an implant as a pending edit, evicting whatever held its slot.
    pub async fn add_implant(
        &self,
        id: &CharacterId,
        item_id: ItemTypeId,
    ) -> Result<Implant, CharacterError> {
        let item = self
            .game_data
            .get_item(item_id)
            .await
            .map_err(catalogue)?
            .ok_or(GameDataError::ItemNotFound(item_id))?;
        let slot = item
            .implant_slot
            .ok_or(CharacterError::NotAnImplant(item_id))?;

        let implant = Implant {
            item_id,
            name: item.name,
            slot,
        };
        let plugged = implant.clone();
        self.edit(id, move |character| character.add_implant(plugged))
            .await?;
        Ok(implant)
    }

    /// Unplug the implant in `slot` as a pending edit.
    pub async fn remove_implant(
        &self,
        id: &CharacterId,
        slot: u8,
    ) -> Result<Option<Implant>, CharacterError> {
        self.edit(id, |character| character.free_slot(slot)).await
    }

    /// Implants of a character, ordered by slot.
    pub async fn implants(&self, id: &CharacterId) -> Result<Vec<Implant>, CharacterError> {
        Ok(self
            .get_character(id)
            .await?
            .implants
            .into_values()
            .collect())
    }

    // ---------------------------------------------------------------------
    // API integration
    // ---------------------------------------------------------------------

    pub async fn api_details(&self, id: &CharacterId) -> Result<ApiDetails, CharacterError> {
        let api = self.get_character(id).await?.api;
        Ok(ApiDetails {
            key_id: api.key_id.unwrap_or_default(),
            v_code: api
                .v_code
                .unwrap_or_else(|| SecretString::from(String::new())),
            default_char: api.default_char.unwrap_or_default(),
            characters: api.characters,
        })
    }

    /// True when key ID, verification code and default character are all set.
    pub async fn api_enabled(&self, id: &CharacterId) -> Result<bool, CharacterError> {
        let details = self.api_details(id).await?;
        Ok(!details.key_id.is_empty()
            && !details.v_code.expose_secret().is_empty()
            && !details.default_char.is_empty())
    }

    /// Store API settings on the saved character and on its pending copy.
    async fn store_api_settings(&self, character: &Character) -> Result<(), CharacterError> {
        self.characters
            .update_api_settings(&character.id, &character.api)
            .await
            .map_err(storage)?;
        if let Some(mut pending) = self.pending.get_mut(&character.id) {
            pending.character.api = character.api.clone();
        }
        Ok(())
    }

    /// Store credentials and fetch the names of the characters on the account.
    ///
    /// Nothing is stored when the API call fails.
    pub async fn api_char_list(
        &self,
        id: &CharacterId,
        key_id: &str,
        v_code: SecretString,
    ) -> Result<Vec<String>, CharacterError> {
        let mut character = self.get_character(id).await?;
        ensure_editable(&character)?;

        let listed = self.api.account_characters(key_id, &v_code).await?;
        let names: Vec<String> = listed.into_iter().map(|c| c.name).collect();

        character.api.key_id = Some(key_id.to_string());
        character.api.v_code = Some(v_code);
        character.api.characters = names.clone();
        self.store_api_settings(&character).await?;

        tracing::info!(id = %id, count = names.len(), "listed API characters");
        Ok(names)
    }

    /// Make `char_name` the default API character and replace the
    /// character's skills with its sheet.
    ///
    /// Returns `None` when the account has no character of that name.
    pub async fn api_fetch(
        &self,
        id: &CharacterId,
        char_name: &str,
    ) -> Result<Option<Character>, CharacterError> {
        let mut character = self.get_character(id).await?;
        ensure_editable(&character)?;

        let (Some(key_id), Some(v_code)) = (character.api.key_id.clone(), character.api.v_code.clone())
        else {
            return Err(ApiError::MissingCredentials.into());
        };

        character.api.default_char = Some(char_name.to_string());
        self.store_api_settings(&character).await?;

        let listed = self.api.account_characters(&key_id, &v_code).await?;
        let Some(api_char) = listed.into_iter().find(|c| c.name == char_name) else {
            tracing::warn!(id = %id, char_name, "character not on API account");
            return Ok(None);
        };

        let sheet = self
            .api
            .character_sheet(&key_id, &v_code, api_char.character_id)
            .await?;
        let updated = self.api_update_char_sheet(id, &sheet.skills).await?;
        tracing::info!(id = %id, skills = sheet.skills.len(), "fetched API character sheet");
        Ok(Some(updated))
    }

    /// Replace every learned skill with the given rows and save. Other
    /// pending edits of the character are saved with them.
    pub async fn api_update_char_sheet(
        &self,
        id: &CharacterId,
        skills: &[SkillRow],
    ) -> Result<Character, CharacterError> {
        self.edit(id, |character| character.replace_skills(skills))
            .await?;
        self.save_character(id).await
    }

    // ---------------------------------------------------------------------
    // Requirements
    // ---------------------------------------------------------------------

    /// Load every item a fit references plus the transitive closure of
    /// their required skills.
    async fn prerequisite_graph(&self, fit: &FitLoadout) -> Result<PrerequisiteGraph, CharacterError> {
        let mut graph = PrerequisiteGraph::new();
        let mut requested: HashSet<ItemTypeId> = HashSet::new();
        let mut frontier: Vec<ItemTypeId> = fit.items();

        while !frontier.is_empty() {
            frontier.retain(|id| requested.insert(*id));
            if frontier.is_empty() {
                break;
            }
            let items = self.game_data.get_items(&frontier).await.map_err(catalogue)?;
            frontier = items
                .iter()
                .flat_map(|item| item.required_skills.iter().map(|req| req.skill_id))
                .filter(|id| !requested.contains(id))
                .collect();
            for item in items {
                graph.insert(item);
            }
        }

        Ok(graph)
    }

    /// Skills the character still lacks for every item of a fit.
    ///
    /// Without a character every requirement counts as unmet.
    pub async fn check_requirements(
        &self,
        fit: &FitLoadout,
        character: Option<&CharacterId>,
    ) -> Result<Vec<ItemRequirements>, CharacterError> {
        let character = match character {
            Some(id) => Some(self.get_character(id).await?),
            None => None,
        };
        let graph = self.prerequisite_graph(fit).await?;
        let dangling = graph.dangling_prerequisites();
        if !dangling.is_empty() {
            tracing::warn!(?dangling, "required skills missing from the catalogue");
        }
        Ok(check_requirements(&graph, fit, character.as_ref()))
    }

    /// Requirement check flattened into an exportable plan.
    pub async fn skill_plan(
        &self,
        fit: &FitLoadout,
        character: Option<&CharacterId>,
    ) -> Result<SkillPlan, CharacterError> {
        let name = match character {
            Some(id) => self.char_name(id).await?,
            None => NO_CHARACTER.to_string(),
        };
        let requirements = self.check_requirements(fit, character).await?;
        Ok(SkillPlan::from_requirements(&name, &requirements))
    }

    // ---------------------------------------------------------------------
    // Catalogue
    // ---------------------------------------------------------------------

    /// Load a catalogue bundle, replacing rows with the same IDs.
    pub async fn import_catalog(
        &self,
        bundle: &GameDataBundle,
    ) -> Result<GameDataImportSummary, CharacterError> {
        let summary = self
            .game_data
            .import_bundle(bundle)
            .await
            .map_err(catalogue)?;
        tracing::info!(
            items = summary.items,
            groups = summary.groups,
            requirements = summary.requirements,
            "imported catalogue"
        );
        Ok(summary)
    }

    // ---------------------------------------------------------------------
    // Files
    // ---------------------------------------------------------------------

    /// Create one character per readable character file.
    ///
    /// Files that cannot be read or parsed are skipped and reported.
    pub async fn import_characters(&self, paths: &[PathBuf]) -> ImportReport {
        let mut report = ImportReport::default();

        for path in paths {
            match self.import_file(path).await {
                Ok(character) => {
                    tracing::info!(path = %path.display(), name = %character.name, "imported character");
                    report.imported.push(character);
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipped character file");
                    report.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    async fn import_file(&self, path: &Path) -> Result<Character, String> {
        let xml = self.fs.read_file(path).await.map_err(|e| e.to_string())?;
        let imported = parse_character_file(&xml).map_err(|e| e.to_string())?;

        let mut character = Character::new(imported.character_name());
        character.replace_skills(&imported.sheet.skills);
        self.characters
            .create(&character)
            .await
            .map_err(|e| e.to_string())
    }

    /// Write a skill plan to `path` in the given format.
    pub async fn write_backup(
        &self,
        path: &Path,
        format: ExportFormat,
        plan: &SkillPlan,
    ) -> Result<(), CharacterError> {
        let bytes = render(plan, format, &self.evemon_revision)
            .map_err(|e| CharacterError::FileSystemError(e.to_string()))?;
        self.fs
            .write_file(path, &bytes)
            .await
            .map_err(|e| CharacterError::FileSystemError(e.to_string()))?;
        tracing::info!(path = %path.display(), %format, entries = plan.entries.len(), "wrote skill backup");
        Ok(())
    }
}

impl<C, G, A, F> CharacterService<C, G, A, F>
where
    C: CharacterRepository + 'static,
    G: GameDataRepository + 'static,
    A: EveApiClient + 'static,
    F: FileSystem + 'static,
{
    /// Run [`Self::import_characters`] on a background task.
    pub fn spawn_import(self: &Arc<Self>, paths: Vec<PathBuf>) -> JoinHandle<ImportReport> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.import_characters(&paths).await })
    }

    /// Run [`Self::write_backup`] on a background task.
    pub fn backup_skills(
        self: &Arc<Self>,
        path: PathBuf,
        format: ExportFormat,
        plan: SkillPlan,
    ) -> JoinHandle<Result<(), CharacterError>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.write_backup(&path, format, &plan).await })
    }
}
