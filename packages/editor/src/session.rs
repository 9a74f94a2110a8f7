//! # Edit Session
//!
//! One editing session over a loaded page: the mirrored component tree, the
//! per-language settings state, the current selection, and the hooks the
//! host editor dispatches into (load/activate, select, clone, drop,
//! attribute update).
//!
//! The session is single-writer by construction: all mutation happens in
//! response to discrete host or network events. The only suspension point
//! is the render round-trip in [`EditSession::update_setting`]; the node
//! being refreshed is marked pending for the duration, and a second edit on
//! a pending ancestor is rejected as a no-op.

use crate::address::{find_by_address, resolve_address, resolve_refresh_target};
use crate::errors::EditorError;
use crate::history::{EditHistory, SettingEdit};
use crate::render::{RenderService, RenderedBlock};
use crate::settings::apply_stored_settings;
use crate::store::{BlockState, SettingsStore};
use pagebloc_engine::{
    deny_layout_access, materialize_blocks, resolve_placeholders, restrict_edit_access,
    BlockDefinition, BlockRegistry, NoComputedStyles, RenderedBlocks, StyleProbe,
};
use pagebloc_tree::{
    serialize_html, user_duplicate, ComponentNode, EditMode, IdGenerator, StyleIdGenerator,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

/// Initial payload delivered by the storage collaborator on page load.
#[derive(Debug, Clone, Deserialize)]
pub struct PageLoad {
    /// Stable identifier of the page, used to seed session ids.
    #[serde(rename = "page-id", default)]
    pub page_id: String,

    /// Non-editable layout tree containing the content container.
    #[serde(default)]
    pub layout: Vec<ComponentNode>,

    /// Per-language raw page components (placeholder nodes).
    #[serde(rename = "page-components", default)]
    pub page_components: HashMap<String, Vec<ComponentNode>>,

    /// Per-language `blockId → rendered fragment` maps.
    #[serde(rename = "rendered-blocks", default)]
    pub rendered_blocks: HashMap<String, RenderedBlocks>,

    /// Per-language stored block state.
    #[serde(rename = "page-blocks", default)]
    pub page_blocks: HashMap<String, HashMap<String, BlockState>>,

    /// Block definitions for the palette.
    #[serde(default)]
    pub blocks: Vec<BlockDefinition>,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(rename = "current-language")]
    pub current_language: String,
}

/// Which sidebar panel a selection should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPanel {
    /// The node's block has setting descriptors.
    Settings,
    /// A plain node with an editable background.
    BackgroundStyle,
    /// Nothing applicable.
    None,
}

/// Decision record for a component selection: which panel to open and which
/// toolbar actions to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionInfo {
    pub panel: SelectionPanel,
    pub removable: bool,
    pub copyable: bool,
    pub draggable: bool,
}

impl SelectionInfo {
    fn none() -> Self {
        SelectionInfo {
            panel: SelectionPanel::None,
            removable: false,
            copyable: false,
            draggable: false,
        }
    }
}

/// Result of an attribute-update hook invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The write was programmatic; the protocol did not run.
    Suppressed,
    /// The refreshable ancestor already has an update in flight.
    RejectedPending,
    /// The refresh completed; `selected` is the re-located node, when found.
    Completed { selected: Option<String> },
}

pub struct EditSession<R: RenderService> {
    service: R,
    registry: BlockRegistry,

    /// Pristine layout template, replayed on every language activation.
    layout: Vec<ComponentNode>,
    /// Pristine per-language page components (placeholders).
    page_components: HashMap<String, Vec<ComponentNode>>,
    /// Pristine per-language rendered-block maps.
    rendered_blocks: HashMap<String, RenderedBlocks>,
    /// Working rendered-block map of the active language; entries are
    /// consumed as placeholders resolve.
    rendered: RenderedBlocks,

    store: SettingsStore,
    tree: ComponentNode,
    languages: Vec<String>,
    current_language: String,
    selection: Option<String>,
    /// Refreshable ancestors with an update in flight.
    pending: HashSet<String>,
    history: EditHistory,
    ids: IdGenerator,
    style_ids: StyleIdGenerator,
    probe: Box<dyn StyleProbe>,
}

impl<R: RenderService> EditSession<R> {
    /// Build a session from the initial page payload and activate the
    /// current language variant.
    pub fn new(page: PageLoad, service: R) -> Result<Self, EditorError> {
        let mut registry = BlockRegistry::new();
        for definition in page.blocks {
            registry.register(definition)?;
        }

        let mut store = SettingsStore::new();
        for language in &page.languages {
            store.ensure_language(language);
        }
        for (language, state) in page.page_blocks {
            store.set_language_state(&language, state);
        }

        let mut session = EditSession {
            service,
            registry,
            layout: page.layout,
            page_components: page.page_components,
            rendered_blocks: page.rendered_blocks,
            rendered: RenderedBlocks::new(),
            store,
            tree: ComponentNode::element("div"),
            languages: page.languages,
            current_language: page.current_language.clone(),
            selection: None,
            pending: HashSet::new(),
            history: EditHistory::new(),
            ids: IdGenerator::new(&page.page_id),
            style_ids: StyleIdGenerator::new(),
            probe: Box::new(NoComputedStyles),
        };
        session.activate_language(&page.current_language)?;
        Ok(session)
    }

    /// Replace the computed-style probe (hosts that expose computed styles).
    pub fn with_style_probe(mut self, probe: Box<dyn StyleProbe>) -> Result<Self, EditorError> {
        self.probe = probe;
        // Permissions derived from the old probe are stale.
        let language = self.current_language.clone();
        self.activate_language(&language)?;
        Ok(self)
    }

    /// Activate a language variant: tear down the previous canvas tree and
    /// rebuild from that variant's components and state.
    pub fn activate_language(&mut self, language: &str) -> Result<(), EditorError> {
        if !self.languages.iter().any(|l| l == language) {
            return Err(EditorError::UnknownLanguage(language.to_string()));
        }

        self.selection = None;
        self.pending.clear();
        self.history.clear();
        self.current_language = language.to_string();

        // Rebuild the canvas from the pristine layout.
        let mut wrapper = ComponentNode::element("div");
        wrapper.children = self.layout.clone();
        wrapper.ensure_ids(&mut self.ids);
        deny_layout_access(&mut wrapper);
        self.tree = wrapper;

        let mut components = self
            .page_components
            .get(language)
            .cloned()
            .unwrap_or_default();
        self.rendered = self
            .rendered_blocks
            .get(language)
            .cloned()
            .unwrap_or_default();

        let container = self
            .tree
            .find_content_container_mut()
            .ok_or(EditorError::MissingContentContainer)?;
        for component in &mut components {
            component.ensure_ids(&mut self.ids);
        }
        container.children = components;
        let container_id = container.id.clone();

        let container = match self.tree.find_mut(&container_id) {
            Some(node) => node,
            None => return Err(EditorError::MissingContentContainer),
        };
        resolve_placeholders(container, &mut self.rendered, &mut self.ids);
        materialize_blocks(container, &mut self.ids);
        apply_stored_settings(
            &mut self.tree,
            &container_id,
            &self.registry,
            &self.store,
            language,
        );
        if let Some(container) = self.tree.find_mut(&container_id) {
            restrict_edit_access(container, false, true, &*self.probe, &mut self.style_ids);
        }

        info!(language, "activated language variant");
        Ok(())
    }

    /// Attribute-update hook: runs the incremental update protocol for
    /// user edits, and is a guarded no-op for programmatic writes.
    pub async fn update_setting(
        &mut self,
        node_id: &str,
        name: &str,
        value: &str,
        mode: EditMode,
    ) -> Result<UpdateOutcome, EditorError> {
        if mode.is_programmatic() {
            return Ok(UpdateOutcome::Suppressed);
        }
        if self.tree.find(node_id).is_none() {
            // Host inconsistency; never escalate.
            return Ok(UpdateOutcome::Suppressed);
        }

        let Some(target) = resolve_refresh_target(&self.tree, node_id) else {
            return Ok(UpdateOutcome::Suppressed);
        };
        if self.pending.contains(&target.ancestor_id) {
            debug!(node = node_id, "update rejected, ancestor refresh in flight");
            return Ok(UpdateOutcome::RejectedPending);
        }

        // The edit travels in the request payload; canvas, store and
        // selection stay exactly as they are until the response lands.
        let previous = self
            .tree
            .find(node_id)
            .and_then(|n| n.attr(name))
            .map(str::to_string);
        let mut data = self.store.snapshot(&self.current_language);
        if let Some(root_id) = &target.address.root_id {
            data.set_setting(root_id, &target.address.path, name, value);
        }

        self.pending.insert(target.ancestor_id.clone());
        debug!(
            node = node_id,
            ancestor = target.ancestor_id.as_str(),
            "requesting block re-render"
        );

        match self.service.render_block(&data, &self.current_language).await {
            Ok(rendered) => {
                self.pending.remove(&target.ancestor_id);
                let outcome = self.apply_render_response(
                    &target.ancestor_id,
                    &target.address.path,
                    data,
                    rendered,
                )?;
                if let UpdateOutcome::Completed {
                    selected: Some(selected),
                } = &outcome
                {
                    self.history.record(SettingEdit {
                        node_id: selected.clone(),
                        name: name.to_string(),
                        previous,
                        value: value.to_string(),
                    });
                }
                Ok(outcome)
            }
            Err(e) => {
                self.pending.remove(&target.ancestor_id);
                error!(node = node_id, error = %e, "block update failed");
                Err(EditorError::RenderFailed(e))
            }
        }
    }

    /// Splice a successful render response back into the tree and restore
    /// the selection via the relative-id trail.
    fn apply_render_response(
        &mut self,
        ancestor_id: &str,
        relative_path: &[String],
        request: crate::store::PageStateData,
        rendered: RenderedBlock,
    ) -> Result<UpdateOutcome, EditorError> {
        // The store entry for the refreshed root becomes the request
        // payload's corresponding substate.
        let substate = request
            .blocks
            .get(&rendered.block_id)
            .cloned()
            .unwrap_or_default();
        self.store.set_root_state(
            &self.current_language,
            rendered.block_id.clone(),
            substate,
        );

        let scope_id = self
            .tree
            .parent_of(ancestor_id)
            .map(|p| p.id.clone())
            .unwrap_or_else(|| self.tree.id.clone());

        let mut fragment = rendered.fragment;
        for node in &mut fragment {
            node.ensure_ids(&mut self.ids);
        }
        self.tree.replace_node(ancestor_id, fragment);

        if let Some(scope) = self.tree.find_mut(&scope_id) {
            resolve_placeholders(scope, &mut self.rendered, &mut self.ids);
            materialize_blocks(scope, &mut self.ids);
        }
        apply_stored_settings(
            &mut self.tree,
            &scope_id,
            &self.registry,
            &self.store,
            &self.current_language,
        );

        let mut selected = None;
        if let Some(scope) = self.tree.find_mut(&scope_id) {
            // Computed styles are not settled on a fresh fragment, so
            // tag-based editability is left off here.
            restrict_edit_access(scope, false, false, &*self.probe, &mut self.style_ids);

            let mut full_path = vec![rendered.block_id.clone()];
            full_path.extend(relative_path.iter().cloned());
            selected = find_by_address(scope, &full_path).map(|n| n.id.clone());
        }

        self.selection = selected.clone();
        debug!(block = rendered.block_id.as_str(), "block refresh applied");
        Ok(UpdateOutcome::Completed { selected })
    }

    /// Selection hook: record the selection and decide which sidebar panel
    /// and toolbar actions apply.
    pub fn select(&mut self, node_id: Option<&str>) -> SelectionInfo {
        let Some(node_id) = node_id else {
            self.selection = None;
            return SelectionInfo::none();
        };
        let Some(node) = self.tree.find(node_id) else {
            self.selection = None;
            return SelectionInfo::none();
        };
        self.selection = Some(node.id.clone());

        let has_settings = node
            .block_slug
            .as_deref()
            .map(|slug| self.registry.has_settings(slug))
            .unwrap_or(false);

        let panel = if has_settings {
            SelectionPanel::Settings
        } else if !node.is_block_root() && self.probe.has_visible_background(node) {
            SelectionPanel::BackgroundStyle
        } else {
            SelectionPanel::None
        };

        SelectionInfo {
            panel,
            removable: node.caps.removable,
            copyable: node.caps.copyable,
            draggable: node.caps.draggable,
        }
    }

    /// Drag-drop-complete hook: insert a palette block at the target
    /// position and run the materialization pipeline on the drop parent.
    /// Returns the materialized root's id, or `None` when the host reported
    /// a drop that produced nothing usable.
    pub fn drop_block(
        &mut self,
        slug: &str,
        target_id: &str,
        index: usize,
    ) -> Result<Option<String>, EditorError> {
        let Some(mut nodes) = self.registry.get(slug).map(|d| d.template.clone()) else {
            return Ok(None);
        };
        for node in &mut nodes {
            node.ensure_ids(&mut self.ids);
        }

        let Some(target) = self.tree.find_mut(target_id) else {
            return Ok(None);
        };
        let insert_index = index.min(target.children.len());
        for (offset, node) in nodes.into_iter().enumerate() {
            target.children.insert(insert_index + offset, node);
        }
        resolve_placeholders(target, &mut self.rendered, &mut self.ids);
        materialize_blocks(target, &mut self.ids);
        apply_stored_settings(
            &mut self.tree,
            target_id,
            &self.registry,
            &self.store,
            &self.current_language,
        );
        let mut root_id = None;
        if let Some(target) = self.tree.find_mut(target_id) {
            restrict_edit_access(target, false, true, &*self.probe, &mut self.style_ids);
            root_id = target.children.get(insert_index).map(|n| n.id.clone());
        }
        Ok(root_id)
    }

    /// Clone hook for user-initiated duplication: copy the node with fresh
    /// styling identity and insert it after the original.
    pub fn duplicate_block(&mut self, node_id: &str) -> Result<Option<String>, EditorError> {
        let Some(node) = self.tree.find(node_id).cloned() else {
            return Ok(None);
        };
        // A shape mismatch means the host mutated the tree mid-copy; the
        // duplicate is abandoned rather than escalated.
        let duplicate = match user_duplicate(&node, &mut self.ids, &mut self.style_ids) {
            Ok(duplicate) => duplicate,
            Err(e) => {
                warn!(node = node_id, error = %e, "duplicate abandoned");
                return Ok(None);
            }
        };
        let duplicate_id = duplicate.id.clone();

        let Some(parent_id) = self.tree.parent_of(node_id).map(|p| p.id.clone()) else {
            return Ok(None);
        };
        if let Some(parent) = self.tree.find_mut(&parent_id) {
            if let Some(position) = parent.children.iter().position(|c| c.id == node_id) {
                parent.children.insert(position + 1, duplicate);
                return Ok(Some(duplicate_id));
            }
        }
        Ok(None)
    }

    /// Explicit save: serialize the editable content and hand it to the
    /// persistence collaborator together with the style payload.
    pub async fn save_page(&self, style: &str) -> Result<(), EditorError> {
        let container = self
            .tree
            .find_content_container()
            .ok_or(EditorError::MissingContentContainer)?;
        let html = serialize_html(container);
        self.service.persist_page(&html, style).await?;
        Ok(())
    }

    /// Undo the latest setting edit on the active variant. Reverts both the
    /// node attribute and the stored value at the node's address, so the
    /// next update request serializes the undone state.
    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.history.undo(&mut self.tree) else {
            return false;
        };
        self.revert_stored_setting(&edit.node_id, &edit.name, edit.previous);
        true
    }

    /// Redo the most recently undone setting edit, tree and store alike.
    pub fn redo(&mut self) -> bool {
        let Some(edit) = self.history.redo(&mut self.tree) else {
            return false;
        };
        self.revert_stored_setting(&edit.node_id, &edit.name, Some(edit.value));
        true
    }

    fn revert_stored_setting(&mut self, node_id: &str, name: &str, value: Option<String>) {
        let Some(address) = resolve_address(&self.tree, node_id) else {
            return;
        };
        let Some(root_id) = address.root_id else {
            return;
        };
        self.store
            .write_setting(&self.current_language, &root_id, &address.path, name, value);
    }

    pub fn tree(&self) -> &ComponentNode {
        &self.tree
    }

    pub fn content_container(&self) -> Option<&ComponentNode> {
        self.tree.find_content_container()
    }

    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn is_pending(&self, node_id: &str) -> bool {
        self.pending.contains(node_id)
    }

    pub fn service(&self) -> &R {
        &self.service
    }
}
