//! # Settings-Path Resolver
//!
//! Block instances are addressed by a root instance id plus a path of
//! relative ids, not by globally unique node identity. The address of a node
//! is computed by walking its ancestors upward until the first settings
//! boundary: the content container, a blocks-container slot, or an
//! HTML-authored block root. Whichever boundary comes first is
//! authoritative, regardless of how the kinds are mixed in the chain.
//!
//! The inverse direction, locating a node again after a refresh, descends
//! by relative-id matching, preferring direct children and falling back to a
//! deeper search.

use crate::store::{BlockState, SettingsStore};
use pagebloc_tree::ComponentNode;
use std::collections::HashMap;

/// Path-based identity of a block instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockAddress {
    /// Block id of the root instance (`None` when the walk stopped on a
    /// node without one; lookups then default to empty).
    pub root_id: Option<String>,

    /// Relative ids from the root instance down to the target, in descent
    /// order. Excludes the root's own id.
    pub path: Vec<String>,
}

/// The minimal independently-refreshable unit around a node, plus the
/// relative-id trail needed to find the node again after a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTarget {
    /// Session id of the nearest ancestor (inclusive) that is not directly
    /// inside a dynamic block.
    pub ancestor_id: String,

    /// Address of the originally targeted node relative to the ancestor.
    pub address: BlockAddress,
}

fn is_settings_boundary(node: &ComponentNode) -> bool {
    node.is_content_container() || node.is_blocks_container() || node.is_html == Some(true)
}

/// Resolve the refreshable ancestor and address for a node, or `None` when
/// the node is not in this tree.
pub fn resolve_refresh_target(root: &ComponentNode, node_id: &str) -> Option<RefreshTarget> {
    let chain = root.ancestor_chain(node_id)?;

    let mut index = chain.len() - 1;
    let mut path = Vec::new();
    while index > 0 && !is_settings_boundary(chain[index - 1]) {
        if let Some(block_id) = &chain[index].block_id {
            path.push(block_id.clone());
        }
        index -= 1;
    }
    path.reverse();

    Some(RefreshTarget {
        ancestor_id: chain[index].id.clone(),
        address: BlockAddress {
            root_id: chain[index].block_id.clone(),
            path,
        },
    })
}

/// Compute the path-based address of a node.
pub fn resolve_address(root: &ComponentNode, node_id: &str) -> Option<BlockAddress> {
    resolve_refresh_target(root, node_id).map(|t| t.address)
}

/// Resolve the stored setting values at an address. Missing levels yield an
/// empty map, never an error.
pub fn resolve_settings(
    store: &SettingsStore,
    language: &str,
    address: &BlockAddress,
) -> HashMap<String, String> {
    let mut state: Option<&BlockState> = address
        .root_id
        .as_deref()
        .and_then(|id| store.root_state(language, id));

    for relative_id in &address.path {
        state = state.and_then(|s| s.blocks.get(relative_id));
    }

    state.map(|s| s.settings.clone()).unwrap_or_default()
}

/// Descend from `scope` through children matching the relative ids in
/// order. Direct children are preferred; when no direct child matches, the
/// search continues deeper with the full remaining path.
pub fn find_by_address<'a>(
    scope: &'a ComponentNode,
    relative_ids: &[String],
) -> Option<&'a ComponentNode> {
    if relative_ids.is_empty() {
        return Some(scope);
    }

    for child in &scope.children {
        if child.block_id.as_deref() == Some(relative_ids[0].as_str()) {
            if let Some(found) = find_by_address(child, &relative_ids[1..]) {
                return Some(found);
            }
        }
    }

    for child in &scope.children {
        if let Some(found) = find_by_address(child, relative_ids) {
            return Some(found);
        }
    }

    None
}
