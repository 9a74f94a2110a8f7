//! # Placeholder Resolution
//!
//! A freshly loaded page contains opaque placeholder nodes standing in for
//! each block's rendered output. This pass splices the server-rendered
//! subtree for each placeholder into the tree, consuming the rendered entry
//! so a second run is a no-op. Rendered fragments may themselves contain
//! placeholders for nested blocks, so the walk continues into freshly
//! inserted nodes.
//!
//! A placeholder without a matching rendered fragment is left in place: a
//! partially rendered page is a supported state, not an error.

use pagebloc_tree::{ComponentNode, IdGenerator, ATTR_BLOCK_ID};
use std::collections::HashMap;
use tracing::debug;

/// Per-language mapping from block instance id to its rendered fragment.
/// A consumed entry is left empty so resolution stays idempotent.
pub type RenderedBlocks = HashMap<String, Vec<ComponentNode>>;

/// Id a placeholder node advertises: rendered roots carry `block-id`, raw
/// page placeholders carry a plain `id`.
pub(crate) fn placeholder_id(node: &ComponentNode) -> Option<&str> {
    node.attr(ATTR_BLOCK_ID).or_else(|| node.attr("id"))
}

/// Replace every unresolved placeholder among `parent`'s descendants for
/// which a rendered fragment exists, recursing into inserted fragments.
pub fn resolve_placeholders(
    parent: &mut ComponentNode,
    rendered: &mut RenderedBlocks,
    ids: &mut IdGenerator,
) {
    let mut index = 0;
    while index < parent.children.len() {
        let fragment = {
            let child = &parent.children[index];
            if child.is_placeholder() {
                placeholder_id(child)
                    .and_then(|id| rendered.get_mut(id))
                    .filter(|f| !f.is_empty())
                    .map(std::mem::take)
            } else {
                None
            }
        };

        if let Some(mut nodes) = fragment {
            debug!(
                block = placeholder_id(&parent.children[index]).unwrap_or(""),
                nodes = nodes.len(),
                "resolved block placeholder"
            );
            parent.children.remove(index);
            for (offset, mut node) in nodes.drain(..).enumerate() {
                node.ensure_ids(ids);
                parent.children.insert(index + offset, node);
            }
            // Re-examine the inserted node: a rendered fragment can itself
            // start with a placeholder for a nested block.
            continue;
        }

        resolve_placeholders(&mut parent.children[index], rendered, ids);
        index += 1;
    }
}
