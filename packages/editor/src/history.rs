//! # Edit History
//!
//! Per-variant undo/redo of setting edits. Each recorded edit carries the
//! value it replaced, so undo is a direct inverse write. A new edit clears
//! the redo stack; switching language variants clears the whole history.
//!
//! Undo and redo write the tree directly, which structurally bypasses the
//! update protocol (only [`crate::session::EditSession::update_setting`]
//! triggers it).

use pagebloc_tree::ComponentNode;

/// One recorded setting edit and its inverse.
#[derive(Debug, Clone)]
pub struct SettingEdit {
    pub node_id: String,
    pub name: String,
    /// Value before the edit; `None` when the attribute was absent.
    pub previous: Option<String>,
    pub value: String,
}

#[derive(Debug)]
pub struct EditHistory {
    undo_stack: Vec<SettingEdit>,
    redo_stack: Vec<SettingEdit>,
    /// Maximum undo depth (0 = unlimited).
    max_levels: usize,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record an applied edit.
    pub fn record(&mut self, edit: SettingEdit) {
        self.undo_stack.push(edit);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        // A new edit invalidates the redone future.
        self.redo_stack.clear();
    }

    /// Undo the most recent edit against the given tree. Returns the edit
    /// that was reverted, so the caller can revert derived state too.
    pub fn undo(&mut self, tree: &mut ComponentNode) -> Option<SettingEdit> {
        let edit = self.undo_stack.pop()?;
        if let Some(node) = tree.find_mut(&edit.node_id) {
            match &edit.previous {
                Some(value) => node.set_attr(edit.name.clone(), value.clone()),
                None => {
                    node.attributes.remove(&edit.name);
                }
            }
        }
        self.redo_stack.push(edit.clone());
        Some(edit)
    }

    /// Redo the most recently undone edit. Returns the re-applied edit.
    pub fn redo(&mut self, tree: &mut ComponentNode) -> Option<SettingEdit> {
        let edit = self.redo_stack.pop()?;
        if let Some(node) = tree.find_mut(&edit.node_id) {
            node.set_attr(edit.name.clone(), edit.value.clone());
        }
        self.undo_stack.push(edit.clone());
        Some(edit)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all history, for language-variant switches.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}
