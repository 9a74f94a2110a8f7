//! Re-application of stored setting values onto materialized block roots.
//!
//! After placeholder resolution and materialization, block roots carry only
//! what the server rendered. This pass writes the stored (or default)
//! setting values back onto each root's markup attributes and re-attaches a
//! persisted style-identifier class when one was saved. It writes the tree
//! directly, so it can never re-enter the update protocol.

use crate::address::{resolve_address, resolve_settings};
use crate::store::SettingsStore;
use pagebloc_engine::BlockRegistry;
use pagebloc_tree::ComponentNode;

/// Apply stored settings to every block root within the subtree rooted at
/// `scope_id`. Addresses are resolved against the full tree, since settings
/// boundaries can lie above the scope.
pub fn apply_stored_settings(
    root: &mut ComponentNode,
    scope_id: &str,
    registry: &BlockRegistry,
    store: &SettingsStore,
    language: &str,
) {
    let mut targets = Vec::new();
    if let Some(scope) = root.find(scope_id) {
        scope.walk(&mut |node| {
            if node.is_block_root() {
                targets.push(node.id.clone());
            }
        });
    }

    for node_id in targets {
        let Some(address) = resolve_address(root, &node_id) else {
            continue;
        };
        let values = resolve_settings(store, language, &address);

        let Some(node) = root.find_mut(&node_id) else {
            continue;
        };

        if let Some(identifier) = values.get("style-identifier") {
            node.style_identifier = Some(identifier.clone());
            node.add_class(identifier.clone());
        }

        let Some(slug) = node.block_slug.clone() else {
            continue;
        };
        let Some(definition) = registry.get(&slug) else {
            continue;
        };
        for descriptor in &definition.settings {
            let value = values
                .get(&descriptor.name)
                .cloned()
                .or_else(|| descriptor.default_value.clone());
            if let Some(value) = value {
                node.set_attr(descriptor.name.clone(), value);
            }
        }
    }
}
