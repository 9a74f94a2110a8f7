//! # Attribute-Preserving Clone
//!
//! The host library's native clone copies tag, classes, markup attributes
//! and children, but not the engine's custom attributes (block id, slug,
//! style identifier). Cloning for engine-internal use therefore walks source
//! and clone in lockstep and copies the custom attributes across.
//!
//! Two clone intents exist and must not be confused:
//!
//! - [`script_clone`]: an engine-internal copy used to read or rebuild a
//!   subtree. Identity is preserved exactly; nothing about the copy counts
//!   as a user edit.
//! - [`user_duplicate`]: the user duplicating a block on the canvas. The
//!   copy must NOT share the original's styling identity, so style
//!   identifiers are dropped and re-minted and the block id resets to the
//!   block slug (the server assigns a fresh instance id on next render).

use crate::errors::TreeError;
use crate::identity::{IdGenerator, StyleIdGenerator};
use crate::node::ComponentNode;

/// What the host's native clone produces: structure and markup only, with
/// fresh session ids and no engine metadata.
fn structural_clone(node: &ComponentNode, ids: &mut IdGenerator) -> ComponentNode {
    ComponentNode {
        id: ids.new_id(),
        tag: node.tag.clone(),
        text: node.text.clone(),
        classes: node.classes.clone(),
        attributes: node.attributes.clone(),
        children: node
            .children
            .iter()
            .map(|c| structural_clone(c, ids))
            .collect(),
        ..ComponentNode::default()
    }
}

/// Copy every custom attribute from `src` onto the corresponding node of a
/// structural clone, walking both trees in lockstep.
///
/// A structural clone guarantees identical shape; a mismatch means the host
/// library mutated one side mid-walk and the copy is abandoned.
pub fn deep_copy_attributes(src: &ComponentNode, dst: &mut ComponentNode) -> Result<(), TreeError> {
    if src.children.len() != dst.children.len() {
        return Err(TreeError::MismatchedCloneShape(src.id.clone()));
    }

    dst.block_id = src.block_id.clone();
    dst.block_slug = src.block_slug.clone();
    dst.style_identifier = src.style_identifier.clone();
    dst.is_html = src.is_html;
    dst.is_style_wrapper = src.is_style_wrapper;
    for (name, value) in &src.attributes {
        dst.attributes.insert(name.clone(), value.clone());
    }

    for (src_child, dst_child) in src.children.iter().zip(dst.children.iter_mut()) {
        deep_copy_attributes(src_child, dst_child)?;
    }
    Ok(())
}

/// Engine-internal clone: structural clone plus custom-attribute copy.
pub fn script_clone(
    node: &ComponentNode,
    ids: &mut IdGenerator,
) -> Result<ComponentNode, TreeError> {
    let mut clone = structural_clone(node, ids);
    deep_copy_attributes(node, &mut clone)?;
    Ok(clone)
}

/// User-facing duplicate: full copy with styling identity re-minted.
pub fn user_duplicate(
    node: &ComponentNode,
    ids: &mut IdGenerator,
    style_ids: &mut StyleIdGenerator,
) -> Result<ComponentNode, TreeError> {
    let mut clone = script_clone(node, ids)?;
    reset_identity(&mut clone, style_ids);
    Ok(clone)
}

fn reset_identity(node: &mut ComponentNode, style_ids: &mut StyleIdGenerator) {
    if let Some(identifier) = node.style_identifier.take() {
        node.remove_class(&identifier);
        let fresh = style_ids.mint();
        node.add_class(fresh.clone());
        node.style_identifier = Some(fresh);
    }
    if let Some(slug) = node.block_slug.clone() {
        // The duplicate is a new instance; until the server renders it, the
        // slug stands in for the instance id.
        node.block_id = Some(slug);
    }
    for child in &mut node.children {
        reset_identity(child, style_ids);
    }
}
