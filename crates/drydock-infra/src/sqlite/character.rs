//! SQLite character repository implementation.
//!
//! Implements `CharacterRepository` from `drydock-core` using sqlx with split
//! read/write pools. A character spans three tables (`characters`,
//! `character_skills`, `character_implants`); writes touch all three in one
//! transaction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::Row;

use drydock_core::repository::character::CharacterRepository;
use drydock_types::character::{ApiSettings, Character, CharacterId, CharacterKind, Implant};
use drydock_types::error::RepositoryError;
use drydock_types::gamedata::ItemTypeId;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `CharacterRepository`.
pub struct SqliteCharacterRepository {
    pool: DatabasePool,
}

impl SqliteCharacterRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Load skills and implants for a character row.
    async fn hydrate(&self, row: CharacterRow) -> Result<Character, RepositoryError> {
        let skill_rows = sqlx::query(
            "SELECT skill_id, level FROM character_skills WHERE character_id = ? ORDER BY skill_id",
        )
        .bind(&row.id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut skills = BTreeMap::new();
        for skill in &skill_rows {
            let skill_id: ItemTypeId = skill.try_get("skill_id").map_err(query_err)?;
            let level: i64 = skill.try_get("level").map_err(query_err)?;
            skills.insert(skill_id, to_u8(level, "skill level")?);
        }

        let implant_rows = sqlx::query(
            "SELECT slot, item_id, name FROM character_implants WHERE character_id = ? ORDER BY slot",
        )
        .bind(&row.id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut implants = BTreeMap::new();
        for implant in &implant_rows {
            let slot = to_u8(implant.try_get("slot").map_err(query_err)?, "implant slot")?;
            implants.insert(
                slot,
                Implant {
                    item_id: implant.try_get("item_id").map_err(query_err)?,
                    name: implant.try_get("name").map_err(query_err)?,
                    slot,
                },
            );
        }

        row.into_character(skills, implants)
    }

    async fn fetch_one(
        &self,
        sql: &str,
        bind: String,
    ) -> Result<Option<Character>, RepositoryError> {
        let row = sqlx::query(sql)
            .bind(bind)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let character_row = CharacterRow::from_row(&row).map_err(query_err)?;
                Ok(Some(self.hydrate(character_row).await?))
            }
            None => Ok(None),
        }
    }
}

/// Internal row type for mapping SQLite rows to a domain Character.
struct CharacterRow {
    id: String,
    name: String,
    kind: String,
    api_key_id: Option<String>,
    api_v_code: Option<String>,
    api_default_char: Option<String>,
    api_characters: String,
    created_at: String,
    updated_at: String,
}

impl CharacterRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            api_key_id: row.try_get("api_key_id")?,
            api_v_code: row.try_get("api_v_code")?,
            api_default_char: row.try_get("api_default_char")?,
            api_characters: row.try_get("api_characters")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_character(
        self,
        skills: BTreeMap<ItemTypeId, u8>,
        implants: BTreeMap<u8, Implant>,
    ) -> Result<Character, RepositoryError> {
        let id = self
            .id
            .parse::<CharacterId>()
            .map_err(|e| RepositoryError::Query(format!("invalid character id: {e}")))?;

        let kind: CharacterKind = self
            .kind
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let characters: Vec<String> = serde_json::from_str(&self.api_characters)
            .map_err(|e| RepositoryError::Query(format!("invalid api_characters JSON: {e}")))?;

        Ok(Character {
            id,
            name: self.name,
            kind,
            skills,
            implants,
            api: ApiSettings {
                key_id: self.api_key_id,
                v_code: self.api_v_code.map(SecretString::from),
                default_char: self.api_default_char,
                characters,
            },
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn to_u8(value: i64, what: &str) -> Result<u8, RepositoryError> {
    u8::try_from(value).map_err(|_| RepositoryError::Query(format!("invalid {what}: {value}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn api_characters_json(settings: &ApiSettings) -> Result<String, RepositoryError> {
    serde_json::to_string(&settings.characters).map_err(|e| RepositoryError::Query(e.to_string()))
}

/// Replace the skill and implant rows of a character inside a transaction.
async fn write_children(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    character: &Character,
) -> Result<(), RepositoryError> {
    let id = character.id.to_string();

    sqlx::query("DELETE FROM character_skills WHERE character_id = ?")
        .bind(&id)
        .execute(&mut **tx)
        .await
        .map_err(query_err)?;
    for (skill_id, level) in &character.skills {
        sqlx::query("INSERT INTO character_skills (character_id, skill_id, level) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(skill_id)
            .bind(i64::from(*level))
            .execute(&mut **tx)
            .await
            .map_err(query_err)?;
    }

    sqlx::query("DELETE FROM character_implants WHERE character_id = ?")
        .bind(&id)
        .execute(&mut **tx)
        .await
        .map_err(query_err)?;
    for implant in character.implants.values() {
        sqlx::query(
            "INSERT INTO character_implants (character_id, slot, item_id, name) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(i64::from(implant.slot))
        .bind(implant.item_id)
        .bind(&implant.name)
        .execute(&mut **tx)
        .await
        .map_err(query_err)?;
    }

    Ok(())
}

impl CharacterRepository for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
        let api_characters = api_characters_json(&character.api)?;
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query(
            "INSERT INTO characters (id, name, kind, api_key_id, api_v_code, api_default_char, api_characters, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(character.id.to_string())
        .bind(&character.name)
        .bind(character.kind.to_string())
        .bind(&character.api.key_id)
        .bind(character.api.v_code.as_ref().map(|v| v.expose_secret().to_string()))
        .bind(&character.api.default_char)
        .bind(&api_characters)
        .bind(format_datetime(&character.created_at))
        .bind(format_datetime(&character.updated_at))
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                return Err(RepositoryError::Conflict(format!(
                    "character '{}' already exists",
                    character.id
                )));
            }
            Err(e) => return Err(query_err(e)),
        }

        write_children(&mut tx, character).await?;
        tx.commit().await.map_err(query_err)?;

        Ok(character.clone())
    }

    async fn get_by_id(&self, id: &CharacterId) -> Result<Option<Character>, RepositoryError> {
        self.fetch_one("SELECT * FROM characters WHERE id = ?", id.to_string())
            .await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Character>, RepositoryError> {
        self.fetch_one(
            "SELECT * FROM characters WHERE name = ? ORDER BY created_at LIMIT 1",
            name.to_string(),
        )
        .await
    }

    async fn get_builtin(&self, kind: CharacterKind) -> Result<Option<Character>, RepositoryError> {
        self.fetch_one("SELECT * FROM characters WHERE kind = ?", kind.to_string())
            .await
    }

    async fn list(&self) -> Result<Vec<Character>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM characters
             ORDER BY CASE kind WHEN 'custom' THEN 1 ELSE 0 END, name, created_at",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut characters = Vec::with_capacity(rows.len());
        for row in &rows {
            let character_row = CharacterRow::from_row(row).map_err(query_err)?;
            characters.push(self.hydrate(character_row).await?);
        }

        Ok(characters)
    }

    async fn update(&self, character: &Character) -> Result<Character, RepositoryError> {
        let api_characters = api_characters_json(&character.api)?;
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query(
            "UPDATE characters SET name = ?, api_key_id = ?, api_v_code = ?, api_default_char = ?, api_characters = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&character.name)
        .bind(&character.api.key_id)
        .bind(character.api.v_code.as_ref().map(|v| v.expose_secret().to_string()))
        .bind(&character.api.default_char)
        .bind(&api_characters)
        .bind(format_datetime(&character.updated_at))
        .bind(character.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        write_children(&mut tx, character).await?;
        tx.commit().await.map_err(query_err)?;

        Ok(character.clone())
    }

    async fn update_api_settings(
        &self,
        id: &CharacterId,
        settings: &ApiSettings,
    ) -> Result<(), RepositoryError> {
        let api_characters = api_characters_json(settings)?;

        let result = sqlx::query(
            "UPDATE characters SET api_key_id = ?, api_v_code = ?, api_default_char = ?, api_characters = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&settings.key_id)
        .bind(settings.v_code.as_ref().map(|v| v.expose_secret().to_string()))
        .bind(&settings.default_char)
        .bind(&api_characters)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use drydock_types::character::SkillLevel;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_character(name: &str) -> Character {
        let mut character = Character::new(name);
        character.set_skill_level(3300, SkillLevel::Level(4));
        character.set_skill_level(3301, SkillLevel::Level(0));
        character.add_implant(Implant {
            item_id: 9941,
            name: "Ocular Filter".to_string(),
            slot: 1,
        });
        character
    }

    #[tokio::test]
    async fn test_create_and_get_character() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        let character = make_character("Pilot");

        repo.create(&character).await.unwrap();
        let loaded = repo.get_by_id(&character.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, "Pilot");
        assert_eq!(loaded.kind, CharacterKind::Custom);
        assert_eq!(loaded.skills, character.skills);
        assert_eq!(loaded.implants[&1].name, "Ocular Filter");
    }

    #[tokio::test]
    async fn test_get_missing_character() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        assert!(repo.get_by_id(&CharacterId::new()).await.unwrap().is_none());
        assert!(repo.get_by_name("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_builtins_are_seeded() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        let all0 = repo.get_builtin(CharacterKind::AllZero).await.unwrap().unwrap();
        let all5 = repo.get_builtin(CharacterKind::AllFive).await.unwrap().unwrap();
        assert_eq!(all0.name, "All 0");
        assert_eq!(all5.skill_level(3300), SkillLevel::Level(5));
    }

    #[tokio::test]
    async fn test_list_puts_builtins_first() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        repo.create(&make_character("Zed")).await.unwrap();
        repo.create(&make_character("Ace")).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["All 0", "All 5", "Ace", "Zed"]);
    }

    #[tokio::test]
    async fn test_update_replaces_skills_and_implants() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        let mut character = make_character("Pilot");
        repo.create(&character).await.unwrap();

        character.name = "Ace".to_string();
        character.set_skill_level(3300, SkillLevel::NotLearned);
        character.set_skill_level(3327, SkillLevel::Level(2));
        character.free_slot(1);
        repo.update(&character).await.unwrap();

        let loaded = repo.get_by_name("Ace").await.unwrap().unwrap();
        assert_eq!(loaded.id, character.id);
        assert_eq!(loaded.skills.len(), 2);
        assert_eq!(loaded.skills[&3327], 2);
        assert!(!loaded.skills.contains_key(&3300));
        assert!(loaded.implants.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_character() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        let result = repo.update(&make_character("Ghost")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_api_settings() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        let character = make_character("Pilot");
        repo.create(&character).await.unwrap();

        let settings = ApiSettings {
            key_id: Some("123".to_string()),
            v_code: Some(SecretString::from("abc".to_string())),
            default_char: Some("Tess Ting".to_string()),
            characters: vec!["Tess Ting".to_string(), "Alt".to_string()],
        };
        repo.update_api_settings(&character.id, &settings).await.unwrap();

        let loaded = repo.get_by_id(&character.id).await.unwrap().unwrap();
        assert_eq!(loaded.api.key_id.as_deref(), Some("123"));
        assert_eq!(
            loaded.api.v_code.as_ref().map(|v| v.expose_secret().to_string()),
            Some("abc".to_string())
        );
        assert_eq!(loaded.api.characters.len(), 2);
        // Skills are untouched
        assert_eq!(loaded.skills, character.skills);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let pool = test_pool().await;
        let repo = SqliteCharacterRepository::new(pool.clone());
        let character = make_character("Pilot");
        repo.create(&character).await.unwrap();

        repo.delete(&character.id).await.unwrap();
        assert!(repo.get_by_id(&character.id).await.unwrap().is_none());

        let (orphans,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM character_skills WHERE character_id = ?")
                .bind(character.id.to_string())
                .fetch_one(&pool.reader)
                .await
                .unwrap();
        assert_eq!(orphans, 0);

        let result = repo.delete(&character.id).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let repo = SqliteCharacterRepository::new(test_pool().await);
        let character = make_character("Pilot");
        repo.create(&character).await.unwrap();
        let result = repo.create(&character).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }
}
