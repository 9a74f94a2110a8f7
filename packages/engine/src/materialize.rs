//! # Block Materialization
//!
//! After placeholder resolution the tree still contains rendered block
//! wrappers (placeholder-tagged nodes now holding the block's rendered
//! children). This pass converts each wrapper into the block's real root
//! node, applying the wrapper policy:
//!
//! - dynamic blocks always get a synthesized `div` root marked as a style
//!   wrapper, so every instance has exactly one addressable, stylable root
//!   regardless of how many top-level nodes the server rendered;
//! - HTML-authored blocks keep their single top-level node as the root when
//!   there is exactly one, preserving author markup; otherwise they get a
//!   synthesized wrapper too.
//!
//! Block metadata from the wrapper (instance id, slug, is-html) moves onto
//! the materialized root, and the pass recurses into the result since
//! resolved fragments can contain nested block wrappers.

use crate::resolve::placeholder_id;
use pagebloc_tree::{ComponentNode, IdGenerator, ATTR_BLOCK_ID, ATTR_BLOCK_SLUG, ATTR_IS_HTML};
use tracing::debug;

/// Materialize every rendered block wrapper among `parent`'s descendants.
pub fn materialize_blocks(parent: &mut ComponentNode, ids: &mut IdGenerator) {
    let mut index = 0;
    while index < parent.children.len() {
        if parent.children[index].is_placeholder() {
            let wrapper = parent.children.remove(index);
            let root = materialize_one(wrapper, ids);
            parent.children.insert(index, root);
        }
        materialize_blocks(&mut parent.children[index], ids);
        index += 1;
    }
}

fn materialize_one(wrapper: ComponentNode, ids: &mut IdGenerator) -> ComponentNode {
    let is_html = wrapper.attr(ATTR_IS_HTML) == Some("true");
    let block_id = placeholder_id(&wrapper).map(str::to_string);
    let block_slug = wrapper
        .attr(ATTR_BLOCK_SLUG)
        .map(str::to_string)
        .or_else(|| block_id.clone());

    let mut children = wrapper.children;

    let mut root = if is_html && children.len() == 1 {
        // Author markup is preserved as-is; no synthetic wrapper.
        children.remove(0)
    } else {
        let mut div = ComponentNode::element("div");
        div.is_style_wrapper = true;
        div.children = children;
        div
    };

    root.block_id = block_id.clone();
    root.block_slug = block_slug;
    root.is_html = Some(is_html);
    for (name, value) in &wrapper.attributes {
        match name.as_str() {
            "id" | ATTR_BLOCK_ID | ATTR_BLOCK_SLUG | ATTR_IS_HTML => {}
            _ => root.set_attr(name.clone(), value.clone()),
        }
    }
    root.ensure_ids(ids);

    debug!(
        block = block_id.as_deref().unwrap_or(""),
        wrapped = root.is_style_wrapper,
        "materialized block root"
    );
    root
}
