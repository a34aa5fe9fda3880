//! Missing-skill trees produced by the requirement walker.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gamedata::ItemTypeId;

/// Unmet skills at one nesting point, keyed by skill name.
pub type RequirementTree = BTreeMap<String, RequirementNode>;

/// One unmet skill requirement and the unmet prerequisites beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementNode {
    pub skill_id: ItemTypeId,
    pub level: u8,
    pub sub_requirements: RequirementTree,
}

impl RequirementNode {
    /// Length of the longest prerequisite chain below and including this node.
    pub fn depth(&self) -> usize {
        1 + tree_depth(&self.sub_requirements)
    }
}

/// Depth of a requirement tree (0 when empty).
pub fn tree_depth(tree: &RequirementTree) -> usize {
    tree.values().map(RequirementNode::depth).max().unwrap_or(0)
}

/// The unmet requirements of one item type in a fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequirements {
    pub item_id: ItemTypeId,
    pub item_name: String,
    pub requirements: RequirementTree,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(skill_id: ItemTypeId, level: u8) -> RequirementNode {
        RequirementNode {
            skill_id,
            level,
            sub_requirements: RequirementTree::new(),
        }
    }

    #[test]
    fn test_depth() {
        let mut inner = RequirementTree::new();
        inner.insert("B".into(), leaf(2, 1));
        let node = RequirementNode {
            skill_id: 1,
            level: 3,
            sub_requirements: inner,
        };
        assert_eq!(node.depth(), 2);
        assert_eq!(tree_depth(&RequirementTree::new()), 0);
    }
}
