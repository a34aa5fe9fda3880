use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::gamedata::ItemTypeId;

/// Highest trainable skill level.
pub const MAX_SKILL_LEVEL: u8 = 5;

/// Unique identifier for a character, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new CharacterId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a CharacterId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharacterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What kind of character a record is.
///
/// - Custom: user-created or imported, fully editable
/// - AllZero: built-in, every skill at level 0
/// - AllFive: built-in, every skill at level 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Custom,
    #[serde(rename = "all0")]
    AllZero,
    #[serde(rename = "all5")]
    AllFive,
}

impl CharacterKind {
    /// Display name the store seeds for a built-in kind.
    pub fn builtin_name(&self) -> Option<&'static str> {
        match self {
            CharacterKind::Custom => None,
            CharacterKind::AllZero => Some("All 0"),
            CharacterKind::AllFive => Some("All 5"),
        }
    }
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterKind::Custom => write!(f, "custom"),
            CharacterKind::AllZero => write!(f, "all0"),
            CharacterKind::AllFive => write!(f, "all5"),
        }
    }
}

impl FromStr for CharacterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(CharacterKind::Custom),
            "all0" => Ok(CharacterKind::AllZero),
            "all5" => Ok(CharacterKind::AllFive),
            other => Err(format!("invalid character kind: '{other}'")),
        }
    }
}

/// A character's standing in one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    NotLearned,
    Level(u8),
}

impl SkillLevel {
    /// Interpret a raw level from user input or an import.
    ///
    /// Anything outside 0..=5 (or missing) means "not learned".
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(level) if (0..=MAX_SKILL_LEVEL as i64).contains(&level) => {
                SkillLevel::Level(level as u8)
            }
            _ => SkillLevel::NotLearned,
        }
    }

    /// True when this level satisfies a requirement of `required`.
    pub fn satisfies(&self, required: u8) -> bool {
        match self {
            SkillLevel::NotLearned => false,
            SkillLevel::Level(level) => *level >= required,
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillLevel::NotLearned => write!(f, "Not learned"),
            SkillLevel::Level(level) => write!(f, "{level}"),
        }
    }
}

/// One row of an imported or fetched character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRow {
    pub type_id: ItemTypeId,
    pub level: i64,
}

/// An implant plugged into one of the character's implant slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implant {
    pub item_id: ItemTypeId,
    pub name: String,
    pub slot: u8,
}

/// Credentials and cached state for the game-data XML API.
///
/// The verification code is wrapped in [`SecretString`] and never serialized.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    pub key_id: Option<String>,
    pub v_code: Option<SecretString>,
    /// Character name on the account whose sheet gets fetched.
    pub default_char: Option<String>,
    /// Character names returned by the last account listing.
    pub characters: Vec<String>,
}

/// A pilot whose skills gate which items can be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub kind: CharacterKind,
    /// Learned skills. Absent skills are not learned.
    pub skills: BTreeMap<ItemTypeId, u8>,
    /// Plugged implants keyed by slot.
    pub implants: BTreeMap<u8, Implant>,
    #[serde(skip)]
    pub api: ApiSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Default name for freshly created characters.
    pub const DEFAULT_NAME: &'static str = "New Character";

    /// Create an empty, editable character.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CharacterId::new(),
            name: name.into(),
            kind: CharacterKind::Custom,
            skills: BTreeMap::new(),
            implants: BTreeMap::new(),
            api: ApiSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create one of the built-in characters.
    pub fn builtin(kind: CharacterKind) -> Self {
        let mut character = Self::new(kind.builtin_name().unwrap_or(Self::DEFAULT_NAME));
        character.kind = kind;
        character
    }

    /// Built-in characters cannot be edited, renamed, or deleted.
    pub fn is_read_only(&self) -> bool {
        self.kind != CharacterKind::Custom
    }

    pub fn skill_level(&self, skill: ItemTypeId) -> SkillLevel {
        match self.kind {
            CharacterKind::AllZero => SkillLevel::Level(0),
            CharacterKind::AllFive => SkillLevel::Level(MAX_SKILL_LEVEL),
            CharacterKind::Custom => self
                .skills
                .get(&skill)
                .map(|level| SkillLevel::Level(*level))
                .unwrap_or(SkillLevel::NotLearned),
        }
    }

    pub fn set_skill_level(&mut self, skill: ItemTypeId, level: SkillLevel) {
        match level {
            SkillLevel::Level(level) => {
                self.skills.insert(skill, level);
            }
            SkillLevel::NotLearned => {
                self.skills.remove(&skill);
            }
        }
    }

    /// Replace every learned skill with the rows of a character sheet.
    ///
    /// Rows with an out-of-range level are dropped (not learned).
    pub fn replace_skills(&mut self, rows: &[SkillRow]) {
        self.skills.clear();
        for row in rows {
            self.set_skill_level(row.type_id, SkillLevel::from_raw(Some(row.level)));
        }
    }

    /// Remove whatever implant occupies `slot`. Returns it if there was one.
    pub fn free_slot(&mut self, slot: u8) -> Option<Implant> {
        self.implants.remove(&slot)
    }

    /// Plug an implant, evicting the previous occupant of its slot.
    pub fn add_implant(&mut self, implant: Implant) {
        self.free_slot(implant.slot);
        self.implants.insert(implant.slot, implant);
    }

    /// Deep copy with a new ID. The copy is always an editable character.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: CharacterId::new(),
            name: format!("{} copy", self.name),
            kind: CharacterKind::Custom,
            skills: self.skills.clone(),
            implants: self.implants.clone(),
            api: self.api.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row of the character picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: CharacterId,
    /// Name with a trailing ` *` when there are unsaved edits.
    pub display_name: String,
    pub active: bool,
    pub dirty: bool,
}

/// Request body for creating a character. Everything is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_display() {
        let id = CharacterId::new();
        let parsed: CharacterId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!("all5".parse::<CharacterKind>().unwrap(), CharacterKind::AllFive);
        assert_eq!(CharacterKind::AllZero.to_string(), "all0");
        assert!("wizard".parse::<CharacterKind>().is_err());
    }

    #[test]
    fn test_skill_level_from_raw() {
        assert_eq!(SkillLevel::from_raw(Some(3)), SkillLevel::Level(3));
        assert_eq!(SkillLevel::from_raw(Some(0)), SkillLevel::Level(0));
        assert_eq!(SkillLevel::from_raw(Some(6)), SkillLevel::NotLearned);
        assert_eq!(SkillLevel::from_raw(Some(-1)), SkillLevel::NotLearned);
        assert_eq!(SkillLevel::from_raw(None), SkillLevel::NotLearned);
    }

    #[test]
    fn test_skill_level_display() {
        assert_eq!(SkillLevel::NotLearned.to_string(), "Not learned");
        assert_eq!(SkillLevel::Level(4).to_string(), "4");
    }

    #[test]
    fn test_builtin_levels() {
        let all0 = Character::builtin(CharacterKind::AllZero);
        let all5 = Character::builtin(CharacterKind::AllFive);
        assert_eq!(all0.name, "All 0");
        assert_eq!(all0.skill_level(3300), SkillLevel::Level(0));
        assert_eq!(all5.skill_level(3300), SkillLevel::Level(5));
        assert!(all0.is_read_only());
        assert!(!Character::new("Pilot").is_read_only());
    }

    #[test]
    fn test_set_and_clear_skill() {
        let mut character = Character::new("Pilot");
        character.set_skill_level(3300, SkillLevel::Level(2));
        assert_eq!(character.skill_level(3300), SkillLevel::Level(2));
        character.set_skill_level(3300, SkillLevel::NotLearned);
        assert_eq!(character.skill_level(3300), SkillLevel::NotLearned);
    }

    #[test]
    fn test_replace_skills_drops_old_and_invalid() {
        let mut character = Character::new("Pilot");
        character.set_skill_level(1, SkillLevel::Level(5));
        character.replace_skills(&[
            SkillRow { type_id: 2, level: 3 },
            SkillRow { type_id: 3, level: 9 },
        ]);
        assert_eq!(character.skill_level(1), SkillLevel::NotLearned);
        assert_eq!(character.skill_level(2), SkillLevel::Level(3));
        assert_eq!(character.skill_level(3), SkillLevel::NotLearned);
    }

    #[test]
    fn test_add_implant_frees_slot() {
        let mut character = Character::new("Pilot");
        character.add_implant(Implant { item_id: 10, name: "Old".into(), slot: 1 });
        character.add_implant(Implant { item_id: 11, name: "New".into(), slot: 1 });
        assert_eq!(character.implants.len(), 1);
        assert_eq!(character.implants[&1].item_id, 11);
    }

    #[test]
    fn test_duplicate_is_editable_copy() {
        let mut source = Character::builtin(CharacterKind::AllFive);
        source.set_skill_level(7, SkillLevel::Level(1));
        let copy = source.duplicate();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, "All 5 copy");
        assert_eq!(copy.kind, CharacterKind::Custom);
        assert_eq!(copy.skills, source.skills);
    }
}
