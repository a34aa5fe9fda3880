//! Requirement walker: which skills does a character still need for a fit?
//!
//! For every item in a fit the walker visits the item's required skills. A
//! requirement the character does not meet (or every requirement, when no
//! character is given) is recorded, and the walker descends into that
//! skill's own requirements to build a nested tree.
//!
//! Rules at each nesting point:
//! - a skill appears at most once; the first requirement seen for it wins
//! - level-0 requirements are never recorded
//! - a skill already on the current path is not entered again, so cyclic
//!   prerequisite data still terminates
//!
//! Items with nothing missing are left out of the result.

use std::collections::HashSet;

use drydock_types::character::Character;
use drydock_types::fit::FitLoadout;
use drydock_types::gamedata::ItemTypeId;
use drydock_types::requirement::{ItemRequirements, RequirementNode, RequirementTree};

use super::graph::PrerequisiteGraph;

/// Unmet skill trees for every item of a fit, in fit order
/// (modules and their charges, drones, ship). Each item type appears once.
pub fn check_requirements(
    graph: &PrerequisiteGraph,
    fit: &FitLoadout,
    character: Option<&Character>,
) -> Vec<ItemRequirements> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for item_id in fit.items() {
        if !seen.insert(item_id) {
            continue;
        }
        let requirements = resolve_item(graph, item_id, character);
        if requirements.is_empty() {
            continue;
        }
        result.push(ItemRequirements {
            item_id,
            item_name: graph.name_of(item_id),
            requirements,
        });
    }

    result
}

/// Unmet skill tree for a single item type.
pub fn resolve_item(
    graph: &PrerequisiteGraph,
    item_id: ItemTypeId,
    character: Option<&Character>,
) -> RequirementTree {
    let mut path = HashSet::from([item_id]);
    walk(graph, item_id, character, &mut path)
}

fn walk(
    graph: &PrerequisiteGraph,
    item_id: ItemTypeId,
    character: Option<&Character>,
    path: &mut HashSet<ItemTypeId>,
) -> RequirementTree {
    let mut tree = RequirementTree::new();
    let Some(item) = graph.get(item_id) else {
        return tree;
    };

    for req in &item.required_skills {
        if req.level == 0 || path.contains(&req.skill_id) {
            continue;
        }

        let name = graph.name_of(req.skill_id);
        if tree.contains_key(&name) {
            continue;
        }

        let met = character.is_some_and(|c| c.skill_level(req.skill_id).satisfies(req.level));
        if met {
            continue;
        }

        path.insert(req.skill_id);
        let sub_requirements = walk(graph, req.skill_id, character, path);
        path.remove(&req.skill_id);

        tree.insert(
            name,
            RequirementNode {
                skill_id: req.skill_id,
                level: req.level,
                sub_requirements,
            },
        );
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_types::character::{CharacterKind, SkillLevel};
    use drydock_types::fit::FittedModule;
    use drydock_types::gamedata::{ItemType, SkillRequirement};
    use drydock_types::requirement::tree_depth;

    const GUNNERY: ItemTypeId = 3300;
    const SMALL_PROJECTILE: ItemTypeId = 3301;
    const MOTION_PREDICTION: ItemTypeId = 3310;
    const SPACESHIP_COMMAND: ItemTypeId = 3327;
    const MINMATAR_FRIGATE: ItemTypeId = 3329;
    const AUTOCANNON: ItemTypeId = 484;
    const AMMO: ItemTypeId = 185;
    const RIFTER: ItemTypeId = 587;
    const CARGO: ItemTypeId = 9000;

    fn item(id: ItemTypeId, name: &str, reqs: &[(ItemTypeId, u8)]) -> ItemType {
        ItemType {
            id,
            group_id: 1,
            name: name.to_string(),
            description: String::new(),
            published: true,
            market_group_id: None,
            implant_slot: None,
            required_skills: reqs
                .iter()
                .map(|(skill_id, level)| SkillRequirement {
                    skill_id: *skill_id,
                    level: *level,
                })
                .collect(),
        }
    }

    fn catalogue() -> PrerequisiteGraph {
        PrerequisiteGraph::from_items([
            item(GUNNERY, "Gunnery", &[]),
            item(SMALL_PROJECTILE, "Small Projectile Turret", &[(GUNNERY, 1)]),
            item(MOTION_PREDICTION, "Motion Prediction", &[(GUNNERY, 3)]),
            item(SPACESHIP_COMMAND, "Spaceship Command", &[]),
            item(MINMATAR_FRIGATE, "Minmatar Frigate", &[(SPACESHIP_COMMAND, 1)]),
            item(
                AUTOCANNON,
                "125mm Gatling AutoCannon I",
                &[(SMALL_PROJECTILE, 3), (GUNNERY, 2)],
            ),
            item(AMMO, "EMP S", &[]),
            item(RIFTER, "Rifter", &[(MINMATAR_FRIGATE, 1)]),
            item(CARGO, "Cargo Container", &[]),
        ])
    }

    fn pilot(levels: &[(ItemTypeId, u8)]) -> Character {
        let mut character = Character::new("Pilot");
        for (skill, level) in levels {
            character.set_skill_level(*skill, SkillLevel::Level(*level));
        }
        character
    }

    fn fit_with(modules: &[ItemTypeId], ship: Option<ItemTypeId>) -> FitLoadout {
        FitLoadout {
            name: None,
            ship,
            modules: modules
                .iter()
                .map(|item| FittedModule {
                    item: *item,
                    charge: None,
                })
                .collect(),
            drones: Vec::new(),
        }
    }

    #[test]
    fn item_without_requirements_has_no_entry() {
        let graph = catalogue();
        let result = check_requirements(&graph, &fit_with(&[CARGO], None), None);
        assert!(result.is_empty());
    }

    #[test]
    fn unmet_requirement_is_recorded_with_sub_requirements() {
        let graph = catalogue();
        let character = pilot(&[(SMALL_PROJECTILE, 1)]);
        let tree = resolve_item(&graph, AUTOCANNON, Some(&character));

        let spt = &tree["Small Projectile Turret"];
        assert_eq!(spt.level, 3);
        assert_eq!(spt.skill_id, SMALL_PROJECTILE);
        assert_eq!(spt.sub_requirements["Gunnery"].level, 1);
        assert_eq!(tree["Gunnery"].level, 2);
    }

    #[test]
    fn character_meeting_everything_gets_empty_result() {
        let graph = catalogue();
        let character = pilot(&[(SMALL_PROJECTILE, 3), (GUNNERY, 2)]);
        let result = check_requirements(&graph, &fit_with(&[AUTOCANNON], None), Some(&character));
        assert!(result.is_empty());
    }

    #[test]
    fn all_five_character_meets_everything() {
        let graph = catalogue();
        let character = Character::builtin(CharacterKind::AllFive);
        let fit = fit_with(&[AUTOCANNON], Some(RIFTER));
        assert!(check_requirements(&graph, &fit, Some(&character)).is_empty());
    }

    #[test]
    fn met_skill_is_not_descended_into() {
        let graph = catalogue();
        // Small Projectile Turret trained, Gunnery not: only the direct Gunnery 2 is missing.
        let character = pilot(&[(SMALL_PROJECTILE, 5)]);
        let tree = resolve_item(&graph, AUTOCANNON, Some(&character));
        assert_eq!(tree.len(), 1);
        assert!(tree["Gunnery"].sub_requirements.is_empty());
    }

    #[test]
    fn missing_character_means_every_requirement_is_unmet() {
        let graph = catalogue();
        let result = check_requirements(&graph, &fit_with(&[], Some(RIFTER)), None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item_name, "Rifter");
        let frigate = &result[0].requirements["Minmatar Frigate"];
        assert_eq!(frigate.sub_requirements["Spaceship Command"].level, 1);
    }

    #[test]
    fn nesting_depth_matches_prerequisite_chain() {
        let graph = PrerequisiteGraph::from_items([
            item(1, "Top", &[(2, 1)]),
            item(2, "Middle", &[(3, 1)]),
            item(3, "Bottom", &[(4, 1)]),
            item(4, "Root", &[]),
        ]);
        let tree = resolve_item(&graph, 1, None);
        assert_eq!(tree_depth(&tree), 3);
        assert_eq!(
            tree["Middle"].sub_requirements["Bottom"].sub_requirements["Root"].level,
            1
        );
    }

    #[test]
    fn outer_level_kept_for_skill_required_directly_and_transitively() {
        let graph = catalogue();
        // Autocannon needs Gunnery 2 directly; Small Projectile Turret needs Gunnery 1.
        let tree = resolve_item(&graph, AUTOCANNON, None);
        assert_eq!(tree["Gunnery"].level, 2);
        assert_eq!(
            tree["Small Projectile Turret"].sub_requirements["Gunnery"].level,
            1
        );
    }

    #[test]
    fn first_seen_level_wins_at_the_same_nesting_point() {
        let graph = PrerequisiteGraph::from_items([
            item(1, "Odd Module", &[(2, 2), (2, 5)]),
            item(2, "Gunnery", &[]),
        ]);
        let tree = resolve_item(&graph, 1, None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["Gunnery"].level, 2);
    }

    #[test]
    fn level_zero_requirements_are_ignored() {
        let graph = PrerequisiteGraph::from_items([
            item(1, "Starter Module", &[(2, 0)]),
            item(2, "Gunnery", &[]),
        ]);
        assert!(resolve_item(&graph, 1, None).is_empty());
    }

    #[test]
    fn cyclic_prerequisites_terminate() {
        let graph = PrerequisiteGraph::from_items([
            item(1, "Module", &[(2, 1)]),
            item(2, "Skill A", &[(3, 1)]),
            item(3, "Skill B", &[(2, 1), (3, 1)]),
        ]);
        let tree = resolve_item(&graph, 1, None);
        let a = &tree["Skill A"];
        let b = &a.sub_requirements["Skill B"];
        assert!(b.sub_requirements.is_empty());
        assert_eq!(tree_depth(&tree), 2);
    }

    #[test]
    fn unknown_skill_is_recorded_as_unmet() {
        let graph = PrerequisiteGraph::from_items([item(1, "Module", &[(77, 4)])]);
        let tree = resolve_item(&graph, 1, None);
        let node = &tree["Unknown #77"];
        assert_eq!(node.level, 4);
        assert!(node.sub_requirements.is_empty());
    }

    #[test]
    fn charges_and_drones_are_checked_and_duplicates_collapse() {
        let graph = PrerequisiteGraph::from_items([
            item(GUNNERY, "Gunnery", &[]),
            item(AMMO, "Advanced Ammo", &[(GUNNERY, 4)]),
            item(50, "Drone", &[(GUNNERY, 1)]),
        ]);
        let fit = FitLoadout {
            name: None,
            ship: None,
            modules: vec![
                FittedModule { item: CARGO, charge: Some(AMMO) },
                FittedModule { item: CARGO, charge: Some(AMMO) },
            ],
            drones: vec![50],
        };
        let result = check_requirements(&graph, &fit, Some(&pilot(&[(GUNNERY, 2)])));
        let names: Vec<&str> = result.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, vec!["Advanced Ammo"]);
        assert_eq!(result[0].requirements["Gunnery"].level, 4);
    }
}
