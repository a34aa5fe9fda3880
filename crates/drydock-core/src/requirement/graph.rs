//! In-memory prerequisite graph.
//!
//! Nodes are item types, edges are their required skills. The graph is
//! built per query from whatever part of the catalogue the query touches and
//! may be incomplete or (with bad data) cyclic.

use std::collections::{HashMap, HashSet};

use drydock_types::gamedata::{ItemType, ItemTypeId};

#[derive(Debug, Clone, Default)]
pub struct PrerequisiteGraph {
    items: HashMap<ItemTypeId, ItemType>,
}

impl PrerequisiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = ItemType>) -> Self {
        let mut graph = Self::new();
        for item in items {
            graph.insert(item);
        }
        graph
    }

    pub fn insert(&mut self, item: ItemType) {
        self.items.insert(item.id, item);
    }

    pub fn get(&self, id: ItemTypeId) -> Option<&ItemType> {
        self.items.get(&id)
    }

    fn contains(&self, id: ItemTypeId) -> bool {
        self.items.contains_key(&id)
    }

    /// Name of an item, or a placeholder when the catalogue lacks it.
    pub fn name_of(&self, id: ItemTypeId) -> String {
        self.items
            .get(&id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| format!("Unknown #{id}"))
    }

    /// Skills referenced by loaded items that are not loaded themselves.
    pub fn dangling_prerequisites(&self) -> Vec<ItemTypeId> {
        let mut seen = HashSet::new();
        let mut dangling = Vec::new();
        for item in self.items.values() {
            for req in &item.required_skills {
                if !self.contains(req.skill_id) && seen.insert(req.skill_id) {
                    dangling.push(req.skill_id);
                }
            }
        }
        dangling.sort_unstable();
        dangling
    }
}
