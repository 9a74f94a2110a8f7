//! # Permission Propagation
//!
//! Depth-first pre-order pass assigning capability flags by structural role.
//! Two parameters are carried downward and updated at block boundaries:
//!
//! - `inside_dynamic_block`: true once below a dynamic block root. Blocks
//!   directly inside a dynamic block are controlled entirely by the parent's
//!   re-render and can only be selected and hovered.
//! - `allow_tag_based_editing`: true inside HTML-authored regions, where a
//!   fixed allow-list of tags becomes text-editable.
//!
//! Every node first has all flags forced false; rules then selectively
//! re-enable. Nodes above the content container are handled separately by
//! [`deny_layout_access`] and never regain any capability.

use pagebloc_tree::{
    is_style_identifier, Capabilities, ComponentNode, StyleIdGenerator, ATTR_CURSOR, ATTR_EDITABLE,
    ATTR_RAW_CONTENT,
};

/// Tags whose text content may be edited inside HTML-authored regions.
///
/// `div` and `span` are deliberately absent: block container divs would
/// become text-typed and could no longer be removed as units.
pub const EDITABLE_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "h7", "img", "button", "p", "small", "b", "strong", "i",
    "em", "ul", "li", "th", "td",
];

/// Access to the host's computed styles, which the mirrored tree does not
/// carry. A node with a visible background is style-selectable even when its
/// tag grants nothing.
pub trait StyleProbe {
    fn has_visible_background(&self, node: &ComponentNode) -> bool;
}

/// Probe for hosts that expose no computed styles (and for tests).
#[derive(Debug, Default)]
pub struct NoComputedStyles;

impl StyleProbe for NoComputedStyles {
    fn has_visible_background(&self, _node: &ComponentNode) -> bool {
        false
    }
}

/// Force-clear every capability on the layout chrome above the content
/// container. Stops at the container itself; its subtree is handled by
/// [`restrict_edit_access`].
pub fn deny_layout_access(node: &mut ComponentNode) {
    if node.is_content_container() {
        return;
    }
    node.caps = Capabilities::NONE;
    node.made_text_editable = false;
    for child in &mut node.children {
        deny_layout_access(child);
    }
}

/// Assign capability flags to `node` and its subtree.
///
/// Call with `(false, true)` on the content container for a full pass; the
/// update protocol calls with `(false, false)` when re-restricting a
/// refreshed subtree, since computed styles are not yet settled there.
pub fn restrict_edit_access(
    node: &mut ComponentNode,
    mut inside_dynamic_block: bool,
    mut allow_tag_based_editing: bool,
    probe: &dyn StyleProbe,
    style_ids: &mut StyleIdGenerator,
) {
    node.caps = Capabilities::NONE;
    node.made_text_editable = false;

    if node.is_content_container() {
        // Sole entry point for dropped page content.
        node.caps.droppable = true;
        node.caps.hoverable = true;
    } else if node.is_block_root() {
        node.caps.selectable = true;
        node.caps.hoverable = true;
        if !inside_dynamic_block {
            // A freely placed block: full control, plus a unique class so
            // styling can target this one instance.
            node.caps.removable = true;
            node.caps.draggable = true;
            node.caps.copyable = true;
            node.caps.stylable = true;
            ensure_unique_class(node, style_ids);
        }
        if node.is_html == Some(true) {
            inside_dynamic_block = false;
            allow_tag_based_editing = true;
        } else {
            inside_dynamic_block = true;
            allow_tag_based_editing = false;
            // Server-owned markup has no text cursor.
            node.set_attr(ATTR_CURSOR, "default");
        }
    }

    let mut allow_for_children = allow_tag_based_editing;
    if allow_tag_based_editing {
        allow_edit_by_attributes(node, probe, style_ids);
        if node.made_text_editable {
            // The text editor must see raw markup, or it re-serializes
            // attributes injected by the host editor.
            node.set_attr(ATTR_RAW_CONTENT, "true");
            allow_for_children = false;
        }
    }

    if node.is_blocks_container() {
        // Nested drop slots stay reachable regardless of the rules above.
        node.caps.hoverable = true;
        node.caps.selectable = true;
        node.caps.droppable = true;
    }

    for child in &mut node.children {
        restrict_edit_access(
            child,
            inside_dynamic_block,
            allow_for_children,
            probe,
            style_ids,
        );
    }
}

/// Tag- and style-based editability within HTML-authored regions.
fn allow_edit_by_attributes(
    node: &mut ComponentNode,
    probe: &dyn StyleProbe,
    style_ids: &mut StyleIdGenerator,
) {
    if EDITABLE_TAGS.contains(&node.tag.as_str()) || node.has_attr(ATTR_EDITABLE) {
        node.caps.editable = true;
        node.made_text_editable = true;
    }

    if probe.has_visible_background(node) || node.tag == "a" {
        node.caps.hoverable = true;
        node.caps.selectable = true;
        node.caps.stylable = true;
        ensure_unique_class(node, style_ids);
    }
}

/// Ensure the node carries a unique style-identifier class, reusing a
/// persisted identifier class when one is already present on the node.
fn ensure_unique_class(node: &mut ComponentNode, style_ids: &mut StyleIdGenerator) {
    if node.style_identifier.is_none() {
        let persisted = node
            .classes
            .iter()
            .find(|c| is_style_identifier(c))
            .cloned();
        node.style_identifier = Some(persisted.unwrap_or_else(|| style_ids.mint()));
    }
    let identifier = node.style_identifier.clone().unwrap_or_default();
    node.add_class(identifier);
}
