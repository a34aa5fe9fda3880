//! Fit loadouts, the input to requirement checks.

use serde::{Deserialize, Serialize};

use crate::gamedata::ItemTypeId;

/// A fitted module and the charge loaded into it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedModule {
    pub item: ItemTypeId,
    #[serde(default)]
    pub charge: Option<ItemTypeId>,
}

/// The equipment of one ship fit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitLoadout {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ship: Option<ItemTypeId>,
    #[serde(default)]
    pub modules: Vec<FittedModule>,
    #[serde(default)]
    pub drones: Vec<ItemTypeId>,
}

impl FitLoadout {
    /// Every item type in the fit, in check order: modules (each followed by
    /// its charge), drones, then the ship.
    pub fn items(&self) -> Vec<ItemTypeId> {
        let mut items = Vec::with_capacity(self.modules.len() * 2 + self.drones.len() + 1);
        for module in &self.modules {
            items.push(module.item);
            items.extend(module.charge);
        }
        items.extend(self.drones.iter().copied());
        items.extend(self.ship);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_order() {
        let fit = FitLoadout {
            name: None,
            ship: Some(1),
            modules: vec![
                FittedModule { item: 10, charge: Some(11) },
                FittedModule { item: 12, charge: None },
            ],
            drones: vec![20],
        };
        assert_eq!(fit.items(), vec![10, 11, 12, 20, 1]);
    }

    #[test]
    fn test_empty_fit_from_json() {
        let fit: FitLoadout = serde_json::from_str("{}").unwrap();
        assert!(fit.items().is_empty());
    }
}
