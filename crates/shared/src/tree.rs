//! Agenda tree as served by `/rest/agenda/item/tree/` and its flattening into
//! an ordered, depth-annotated list for linear display.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ItemId;

/// Maximum nesting the flattener descends into, counting grouping wrappers.
pub const MAX_TREE_DEPTH: usize = 128;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(id: ItemId) -> Self {
        Self {
            id: Some(id),
            children: Vec::new(),
        }
    }

    pub fn with_children(id: ItemId, children: Vec<TreeNode>) -> Self {
        Self {
            id: Some(id),
            children,
        }
    }

    /// A structural node without an item of its own.
    pub fn group(children: Vec<TreeNode>) -> Self {
        Self { id: None, children }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    pub id: ItemId,
    pub depth: usize,
}

pub fn flatten(forest: &[TreeNode]) -> Vec<FlatNode> {
    flatten_from(forest, 0)
}

/// Flattens `forest` in pre-order starting at `start_depth`.
///
/// Children of an item sit one level below it. A node without an id emits
/// nothing and its children stay at the node's own depth. Each id is emitted
/// once; a repeated id is skipped together with its subtree.
pub fn flatten_from(forest: &[TreeNode], start_depth: usize) -> Vec<FlatNode> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    visit(forest, start_depth, MAX_TREE_DEPTH, &mut out, &mut seen);
    out
}

fn visit(
    nodes: &[TreeNode],
    depth: usize,
    budget: usize,
    out: &mut Vec<FlatNode>,
    seen: &mut HashSet<ItemId>,
) {
    if nodes.is_empty() {
        return;
    }
    if budget == 0 {
        warn!(depth, "agenda tree nested deeper than {MAX_TREE_DEPTH} levels; truncating");
        return;
    }

    for node in nodes {
        match node.id {
            Some(id) => {
                if !seen.insert(id) {
                    warn!(item_id = id.0, "agenda tree lists item more than once; skipping");
                    continue;
                }
                out.push(FlatNode { id, depth });
                visit(&node.children, depth.saturating_add(1), budget - 1, out, seen);
            }
            None => visit(&node.children, depth, budget - 1, out, seen),
        }
    }
}

/// Ids that [`flatten`] places at depth 0, in order. Items inside root-level
/// wrappers count as top level.
pub fn top_level_ids(forest: &[TreeNode]) -> Vec<ItemId> {
    flatten(forest)
        .into_iter()
        .filter(|node| node.depth == 0)
        .map(|node| node.id)
        .collect()
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
