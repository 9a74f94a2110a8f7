//! # Component Node Model
//!
//! Mirror of the host editor's component tree.
//!
//! The host library owns the live canvas tree; the engine works on this
//! mirrored structure and requests changes through generic node operations
//! (insert, remove, replace, set-attribute, clone). Each node carries:
//!
//! - a stable per-session id,
//! - the rendered markup attributes (an opaque map, part of the wire format),
//! - a typed set of capability flags the permission pass assigns,
//! - block metadata (instance id, slug, style identifier) the engine manages.

use crate::markup::{
    ATTR_BLOCKS_CONTAINER, ATTR_CONTENT_CONTAINER, PLACEHOLDER_TAG,
};
use crate::identity::IdGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capability flags assigned by permission propagation.
///
/// All flags default to `false`; the permission pass force-clears them on
/// every node before selectively re-enabling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub selectable: bool,
    pub draggable: bool,
    pub droppable: bool,
    pub stylable: bool,
    pub editable: bool,
    pub removable: bool,
    pub copyable: bool,
    pub hoverable: bool,
    pub layerable: bool,
    pub resizable: bool,
    pub badgable: bool,
    pub highlightable: bool,
}

impl Capabilities {
    /// Everything disabled.
    pub const NONE: Capabilities = Capabilities {
        selectable: false,
        draggable: false,
        droppable: false,
        stylable: false,
        editable: false,
        removable: false,
        copyable: false,
        hoverable: false,
        layerable: false,
        resizable: false,
        badgable: false,
        highlightable: false,
    };

    /// True if any flag is enabled.
    pub fn any(&self) -> bool {
        *self != Capabilities::NONE
    }
}

/// Whether an attribute write originates from the user or from the engine
/// replaying stored values.
///
/// The original reference for this engine used a shared guard flag; here the
/// mode is an explicit parameter so suppression of the update protocol is
/// visible in every call signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// A user-driven edit; may trigger the incremental update protocol.
    UserEdit,
    /// The engine applying stored values (materialization, clone bookkeeping,
    /// update-response handling); never triggers further updates.
    ApplyingStoredValues,
}

impl EditMode {
    pub fn is_programmatic(&self) -> bool {
        matches!(self, EditMode::ApplyingStoredValues)
    }
}

/// A node in the mirrored component tree.
///
/// Fragments arriving from the render service deserialize into this type;
/// session ids are assigned on attach via [`ComponentNode::ensure_ids`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentNode {
    /// Stable per-session id, assigned by the engine on attach.
    pub id: String,

    /// Tag name; empty for text nodes.
    pub tag: String,

    /// Text content, for text nodes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Ordered CSS classes.
    pub classes: Vec<String>,

    /// Rendered markup attributes (opaque to the engine except for the
    /// `phpb-*` markers and block metadata it recognizes).
    pub attributes: HashMap<String, String>,

    /// Capability flags; engine-internal, never serialized to the server.
    #[serde(skip)]
    pub caps: Capabilities,

    /// Block instance id, unique only among sibling block instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,

    /// Slug of the block definition this node was materialized from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_slug: Option<String>,

    /// Globally unique styling class, assigned lazily.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_identifier: Option<String>,

    /// `Some(true)` for HTML-authored block roots, `Some(false)` for dynamic
    /// block roots, `None` for everything else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_html: Option<bool>,

    /// True for synthesized wrapper roots added by block materialization.
    pub is_style_wrapper: bool,

    /// Set by the permission pass when the node was made text-editable.
    #[serde(skip)]
    pub made_text_editable: bool,

    /// Ordered owned children.
    pub children: Vec<ComponentNode>,
}

impl Default for ComponentNode {
    fn default() -> Self {
        ComponentNode {
            id: String::new(),
            tag: String::new(),
            text: None,
            classes: Vec::new(),
            attributes: HashMap::new(),
            caps: Capabilities::NONE,
            block_id: None,
            block_slug: None,
            style_identifier: None,
            is_html: None,
            is_style_wrapper: false,
            made_text_editable: false,
            children: Vec::new(),
        }
    }
}

impl ComponentNode {
    /// Create an element node with the given tag.
    pub fn element(tag: impl Into<String>) -> Self {
        ComponentNode {
            tag: tag.into(),
            ..ComponentNode::default()
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        ComponentNode {
            text: Some(content.into()),
            ..ComponentNode::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class.into());
        self
    }

    pub fn with_children(mut self, children: Vec<ComponentNode>) -> Self {
        self.children = children;
        self
    }

    /// True for text nodes (no tag, text content present).
    pub fn is_text(&self) -> bool {
        self.tag.is_empty() && self.text.is_some()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn is_content_container(&self) -> bool {
        self.has_attr(ATTR_CONTENT_CONTAINER)
    }

    pub fn is_blocks_container(&self) -> bool {
        self.has_attr(ATTR_BLOCKS_CONTAINER)
    }

    pub fn is_placeholder(&self) -> bool {
        self.tag == PLACEHOLDER_TAG
    }

    /// True for block roots (nodes materialized from a block definition).
    pub fn is_block_root(&self) -> bool {
        self.block_slug.is_some()
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Assign session ids to this node and all descendants that lack one.
    pub fn ensure_ids(&mut self, ids: &mut IdGenerator) {
        if self.id.is_empty() {
            self.id = ids.new_id();
        }
        for child in &mut self.children {
            child.ensure_ids(ids);
        }
    }

    /// Find a descendant (or this node) by session id, pre-order.
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Mutable variant of [`ComponentNode::find`].
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Find the parent of the node with the given id.
    ///
    /// The tree is owned top-down, so parent links are computed by search.
    pub fn parent_of(&self, id: &str) -> Option<&ComponentNode> {
        if self.children.iter().any(|c| c.id == id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.parent_of(id))
    }

    /// Ancestor chain from this node down to (and including) the target.
    ///
    /// Returns `None` if the target is not in this subtree.
    pub fn ancestor_chain(&self, id: &str) -> Option<Vec<&ComponentNode>> {
        if self.id == id {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut chain) = child.ancestor_chain(id) {
                chain.insert(0, self);
                return Some(chain);
            }
        }
        None
    }

    /// Replace the node with the given id by zero or more nodes at the same
    /// position in its parent's children. Returns the removed node, or `None`
    /// if the id was not found (a guarded no-op, per the error policy for
    /// host-supplied trees).
    pub fn replace_node(
        &mut self,
        id: &str,
        replacement: Vec<ComponentNode>,
    ) -> Option<ComponentNode> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            let removed = self.children.remove(pos);
            for (offset, node) in replacement.into_iter().enumerate() {
                self.children.insert(pos + offset, node);
            }
            return Some(removed);
        }
        for child in &mut self.children {
            if let Some(removed) = child.replace_node(id, replacement.clone()) {
                return Some(removed);
            }
        }
        None
    }

    /// Remove the node with the given id from this subtree and return it.
    pub fn remove_node(&mut self, id: &str) -> Option<ComponentNode> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children.iter_mut().find_map(|c| c.remove_node(id))
    }

    /// Locate the single content-container node in this subtree.
    pub fn find_content_container(&self) -> Option<&ComponentNode> {
        if self.is_content_container() {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_content_container())
    }

    /// Mutable variant of [`ComponentNode::find_content_container`].
    pub fn find_content_container_mut(&mut self) -> Option<&mut ComponentNode> {
        if self.is_content_container() {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_content_container_mut())
    }

    /// Visit this node and all descendants, pre-order.
    pub fn walk(&self, visit: &mut dyn FnMut(&ComponentNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ComponentNode {
        let mut root = ComponentNode::element("body");
        root.id = "root".to_string();

        let mut section = ComponentNode::element("section");
        section.id = "section".to_string();

        let mut p = ComponentNode::element("p");
        p.id = "p".to_string();

        section.children.push(p);
        root.children.push(section);
        root
    }

    #[test]
    fn test_fragment_deserializes_without_internal_state() {
        let json = r#"{
            "tag": "phpb-block",
            "attributes": { "block-id": "hero" },
            "children": [
                { "tag": "h1", "classes": ["headline"], "children": [
                    { "tag": "", "text": "Hello" }
                ] }
            ]
        }"#;

        let node: ComponentNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.tag, PLACEHOLDER_TAG);
        assert_eq!(node.attr("block-id"), Some("hero"));
        assert!(node.id.is_empty(), "session ids are assigned on attach");
        assert!(!node.caps.any());

        let text = &node.children[0].children[0];
        assert!(text.is_text());
        assert_eq!(text.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_find_and_parent() {
        let tree = sample_tree();

        assert_eq!(tree.find("p").unwrap().tag, "p");
        assert_eq!(tree.parent_of("p").unwrap().id, "section");
        assert_eq!(tree.parent_of("section").unwrap().id, "root");
        assert!(tree.parent_of("root").is_none());
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_ancestor_chain_order() {
        let tree = sample_tree();

        let chain = tree.ancestor_chain("p").unwrap();
        let ids: Vec<&str> = chain.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "section", "p"]);
    }

    #[test]
    fn test_replace_node_splices_in_place() {
        let mut tree = sample_tree();

        let mut a = ComponentNode::element("div");
        a.id = "a".to_string();
        let mut b = ComponentNode::element("div");
        b.id = "b".to_string();

        let removed = tree.replace_node("p", vec![a, b]).unwrap();
        assert_eq!(removed.id, "p");

        let section = tree.find("section").unwrap();
        let ids: Vec<&str> = section.children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_replace_missing_node_is_noop() {
        let mut tree = sample_tree();
        let before = tree.clone();

        assert!(tree.replace_node("missing", vec![]).is_none());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_ensure_ids_fills_empty_only() {
        let mut ids = IdGenerator::new("test-page");
        let mut node = ComponentNode::element("div")
            .with_children(vec![ComponentNode::element("span")]);
        node.id = "kept".to_string();

        node.ensure_ids(&mut ids);

        assert_eq!(node.id, "kept");
        assert!(!node.children[0].id.is_empty());
    }

    #[test]
    fn test_class_handling_deduplicates() {
        let mut node = ComponentNode::element("div");
        node.add_class("a");
        node.add_class("a");
        node.add_class("b");

        assert_eq!(node.classes, vec!["a", "b"]);

        node.remove_class("a");
        assert!(!node.has_class("a"));
        assert!(node.has_class("b"));
    }

    #[test]
    fn test_capabilities_default_none() {
        let node = ComponentNode::element("div");
        assert!(!node.caps.any());
    }
}
