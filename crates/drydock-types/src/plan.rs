//! Flattened skill plans, the unit of export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::gamedata::ItemTypeId;
use crate::requirement::{ItemRequirements, RequirementTree};

/// One line of a skill plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Item whose requirements this entry belongs to.
    pub item: String,
    pub skill: String,
    pub skill_id: ItemTypeId,
    pub level: u8,
    /// Nesting depth (0 = direct requirement of the item).
    pub indent: usize,
}

/// Skills a character still has to train for a fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPlan {
    pub character_name: String,
    pub entries: Vec<PlanEntry>,
}

impl SkillPlan {
    /// Flatten requirement trees depth-first, parents before their prerequisites.
    pub fn from_requirements(character_name: &str, requirements: &[ItemRequirements]) -> Self {
        let mut entries = Vec::new();
        for item in requirements {
            flatten(&item.item_name, &item.requirements, 0, &mut entries);
        }
        Self {
            character_name: character_name.to_string(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(item: &str, tree: &RequirementTree, indent: usize, out: &mut Vec<PlanEntry>) {
    for (skill, node) in tree {
        out.push(PlanEntry {
            item: item.to_string(),
            skill: skill.clone(),
            skill_id: node.skill_id,
            level: node.level,
            indent,
        });
        flatten(item, &node.sub_requirements, indent + 1, out);
    }
}

/// Output format for skill plan backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Indented plain text.
    Text,
    /// EVEMon plan XML.
    Xml,
    /// Gzip-compressed EVEMon plan XML.
    Emp,
}

impl ExportFormat {
    /// Conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Xml => "xml",
            ExportFormat::Emp => "emp",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Emp
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "xml" => Ok(ExportFormat::Xml),
            "emp" => Ok(ExportFormat::Emp),
            other => Err(format!("invalid export format: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::RequirementNode;

    #[test]
    fn test_flatten_depth_first() {
        let mut subs = RequirementTree::new();
        subs.insert(
            "Gunnery".into(),
            RequirementNode {
                skill_id: 3300,
                level: 2,
                sub_requirements: RequirementTree::new(),
            },
        );
        let mut top = RequirementTree::new();
        top.insert(
            "Small Projectile Turret".into(),
            RequirementNode {
                skill_id: 3301,
                level: 3,
                sub_requirements: subs,
            },
        );
        let reqs = vec![ItemRequirements {
            item_id: 484,
            item_name: "125mm Gatling AutoCannon I".into(),
            requirements: top,
        }];

        let plan = SkillPlan::from_requirements("Pilot", &reqs);
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[0].skill, "Small Projectile Turret");
        assert_eq!(plan.entries[0].indent, 0);
        assert_eq!(plan.entries[1].skill, "Gunnery");
        assert_eq!(plan.entries[1].indent, 1);
        assert_eq!(plan.entries[1].item, "125mm Gatling AutoCannon I");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("EMP".parse::<ExportFormat>().unwrap(), ExportFormat::Emp);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::default(), ExportFormat::Emp);
    }
}
