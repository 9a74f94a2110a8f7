//! # Settings Store
//!
//! Per-language, recursively nested storage of block setting values.
//!
//! Keys are *relative* block ids: unique only within their immediate parent
//! scope. The same nested structure is replayed for every instance of a
//! reusable block, so identical slugs can appear at different addresses with
//! independent values. Missing entries default to empty; lookups never fail.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored state of one block instance: its own setting values plus the
/// states of nested blocks, keyed by relative id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockState {
    pub settings: HashMap<String, String>,
    pub blocks: HashMap<String, BlockState>,
}

/// Request payload of a render-block call: the entire current language's
/// block state, since a parent's re-render must be able to recompute any
/// descendant's values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageStateData {
    pub blocks: HashMap<String, BlockState>,
}

impl PageStateData {
    /// Write a setting value at an address, creating missing levels.
    pub fn set_setting(&mut self, root_id: &str, path: &[String], name: &str, value: &str) {
        let mut state = self.blocks.entry(root_id.to_string()).or_default();
        for relative_id in path {
            state = state.blocks.entry(relative_id.clone()).or_default();
        }
        state.settings.insert(name.to_string(), value.to_string());
    }
}

/// Per-language settings storage. One language variant is current at a
/// time; each holds an independent map of root instance id to state.
#[derive(Debug, Default)]
pub struct SettingsStore {
    languages: HashMap<String, HashMap<String, BlockState>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the (empty) entry for a language if absent.
    pub fn ensure_language(&mut self, language: &str) {
        self.languages.entry(language.to_string()).or_default();
    }

    pub fn set_language_state(&mut self, language: &str, state: HashMap<String, BlockState>) {
        self.languages.insert(language.to_string(), state);
    }

    /// State of a root block instance, if stored.
    pub fn root_state(&self, language: &str, root_id: &str) -> Option<&BlockState> {
        self.languages.get(language)?.get(root_id)
    }

    /// Replace the stored state of a root block instance wholesale.
    pub fn set_root_state(&mut self, language: &str, root_id: String, state: BlockState) {
        self.languages
            .entry(language.to_string())
            .or_default()
            .insert(root_id, state);
    }

    /// Write a setting value at an address, creating missing levels.
    /// `None` removes the entry, for reverting an edit whose attribute was
    /// previously absent.
    pub fn write_setting(
        &mut self,
        language: &str,
        root_id: &str,
        path: &[String],
        name: &str,
        value: Option<String>,
    ) {
        let mut state = self
            .languages
            .entry(language.to_string())
            .or_default()
            .entry(root_id.to_string())
            .or_default();
        for relative_id in path {
            state = state.blocks.entry(relative_id.clone()).or_default();
        }
        match value {
            Some(value) => {
                state.settings.insert(name.to_string(), value);
            }
            None => {
                state.settings.remove(name);
            }
        }
    }

    /// Snapshot of a language's full block state, in the wire format of a
    /// render-block request.
    pub fn snapshot(&self, language: &str) -> PageStateData {
        PageStateData {
            blocks: self.languages.get(language).cloned().unwrap_or_default(),
        }
    }
}
