//! Static game-data catalogue types.
//!
//! Item types (ships, modules, charges, drones, implants, and skills
//! themselves) carry the skills they require. Skills are item types whose
//! group belongs to [`SKILL_CATEGORY_ID`].

use serde::{Deserialize, Serialize};

/// Numeric type ID as used by the game's static data export.
pub type ItemTypeId = i64;

/// Inventory category holding every skill group.
pub const SKILL_CATEGORY_ID: i64 = 16;

/// A (skill, minimum level) prerequisite of an item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill_id: ItemTypeId,
    pub level: u8,
}

/// An item type from the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    pub id: ItemTypeId,
    pub group_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub market_group_id: Option<i64>,
    /// Set for implants and boosters only.
    #[serde(default)]
    pub implant_slot: Option<u8>,
    /// Prerequisites in catalogue order.
    #[serde(default)]
    pub required_skills: Vec<SkillRequirement>,
}

fn default_published() -> bool {
    true
}

/// An inventory group (e.g. "Gunnery" inside the skill category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGroup {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

/// A market browser group, which carries the long-form description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Catalogue bundle loaded by `drydock catalog import`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDataBundle {
    #[serde(default)]
    pub market_groups: Vec<MarketGroup>,
    #[serde(default)]
    pub groups: Vec<ItemGroup>,
    #[serde(default)]
    pub items: Vec<ItemType>,
}

/// Counts reported after a catalogue import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDataImportSummary {
    pub market_groups: usize,
    pub groups: usize,
    pub items: usize,
    pub requirements: usize,
}
