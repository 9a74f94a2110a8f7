//! # Block Registry
//!
//! Load-time catalog of block definitions, delivered with the initial page
//! payload and registered into the host editor's block palette.

use crate::errors::RegistryError;
use pagebloc_tree::ComponentNode;
use serde::Deserialize;
use std::collections::HashMap;

/// One configurable setting of a block, shown in the settings side panel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingDescriptor {
    pub name: String,

    /// Input type of the setting ("text", "select", "checkbox", ...).
    #[serde(rename = "type", default)]
    pub input_type: String,

    /// Display label; falls back to the name when absent.
    #[serde(default)]
    pub label: Option<String>,

    #[serde(rename = "default-value", default)]
    pub default_value: Option<String>,
}

/// Static, read-only definition of a reusable block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockDefinition {
    pub slug: String,

    /// Template fragment shown in the palette and dropped onto the canvas.
    #[serde(default)]
    pub template: Vec<ComponentNode>,

    /// Ordered setting descriptors.
    #[serde(default)]
    pub settings: Vec<SettingDescriptor>,

    /// True for HTML-authored blocks (directly editable markup), false for
    /// dynamic blocks (server-rendered, opaque children).
    #[serde(rename = "is-html", default)]
    pub is_html: bool,
}

/// Slug-keyed catalog of block definitions.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: HashMap<String, BlockDefinition>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, normalizing its template.
    ///
    /// Whitespace-only text children of blocks-container elements are
    /// emptied: the host editor types such containers as text otherwise,
    /// which breaks drop positioning inside them.
    pub fn register(&mut self, mut definition: BlockDefinition) -> Result<(), RegistryError> {
        if self.blocks.contains_key(&definition.slug) {
            return Err(RegistryError::DuplicateSlug(definition.slug));
        }
        for node in &mut definition.template {
            strip_container_whitespace(node);
        }
        self.blocks.insert(definition.slug.clone(), definition);
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<&BlockDefinition> {
        self.blocks.get(slug)
    }

    /// Whether the block identified by `slug` has any setting descriptors.
    pub fn has_settings(&self, slug: &str) -> bool {
        self.blocks
            .get(slug)
            .map(|b| !b.settings.is_empty())
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn strip_container_whitespace(node: &mut ComponentNode) {
    if node.is_blocks_container() {
        node.children
            .retain(|c| !(c.is_text() && c.text.as_deref().is_some_and(|t| t.trim().is_empty())));
    }
    for child in &mut node.children {
        strip_container_whitespace(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebloc_tree::ATTR_BLOCKS_CONTAINER;

    fn definition(slug: &str) -> BlockDefinition {
        BlockDefinition {
            slug: slug.to_string(),
            template: vec![],
            settings: vec![],
            is_html: false,
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = BlockRegistry::new();
        registry.register(definition("hero")).unwrap();

        assert!(registry.get("hero").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut registry = BlockRegistry::new();
        registry.register(definition("hero")).unwrap();

        let result = registry.register(definition("hero"));
        assert_eq!(result, Err(RegistryError::DuplicateSlug("hero".to_string())));
    }

    #[test]
    fn test_has_settings() {
        let mut registry = BlockRegistry::new();
        let mut def = definition("hero");
        def.settings.push(SettingDescriptor {
            name: "title".to_string(),
            input_type: "text".to_string(),
            label: None,
            default_value: Some("Welcome".to_string()),
        });
        registry.register(def).unwrap();
        registry.register(definition("plain")).unwrap();

        assert!(registry.has_settings("hero"));
        assert!(!registry.has_settings("plain"));
        assert!(!registry.has_settings("missing"));
    }

    #[test]
    fn test_definition_deserializes_from_payload_json() {
        let json = r#"{
            "slug": "hero",
            "is-html": false,
            "settings": [
                {"name": "title", "type": "text", "default-value": "Welcome"}
            ]
        }"#;

        let def: BlockDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.slug, "hero");
        assert!(!def.is_html);
        assert_eq!(def.settings[0].default_value.as_deref(), Some("Welcome"));
    }

    #[test]
    fn test_whitespace_only_container_children_are_stripped() {
        let template = ComponentNode::element("div").with_children(vec![ComponentNode::element(
            "div",
        )
        .with_attr(ATTR_BLOCKS_CONTAINER, "")
        .with_children(vec![
            ComponentNode::text("\n    "),
            ComponentNode::element("span"),
        ])]);

        let mut registry = BlockRegistry::new();
        let mut def = definition("columns");
        def.template = vec![template];
        registry.register(def).unwrap();

        let container = &registry.get("columns").unwrap().template[0].children[0];
        assert_eq!(container.children.len(), 1);
        assert_eq!(container.children[0].tag, "span");
    }
}
