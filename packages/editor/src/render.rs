//! # Render Service Interface
//!
//! The engine never renders block markup itself; a server-side collaborator
//! does. This module defines the async boundary to it: re-render one block
//! subtree from serialized state, and persist the page on explicit save.

use crate::store::PageStateData;
use pagebloc_tree::ComponentNode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("render request failed: {0}")]
    Request(String),

    #[error("persist request failed: {0}")]
    Persist(String),
}

/// Response of a render-block call. The server echoes the id of the block
/// it rendered so the caller can key the settings-store update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderedBlock {
    #[serde(rename = "block-id")]
    pub block_id: String,

    /// Rendered fragment, still wrapped in its placeholder-tagged root.
    #[serde(default)]
    pub fragment: Vec<ComponentNode>,
}

/// Server-side rendering and persistence collaborator.
#[allow(async_fn_in_trait)]
pub trait RenderService {
    /// Re-render one block from the serialized page state.
    async fn render_block(
        &self,
        data: &PageStateData,
        language: &str,
    ) -> Result<RenderedBlock, RenderError>;

    /// Persist the page on explicit user save.
    async fn persist_page(&self, html: &str, style: &str) -> Result<(), RenderError>;
}
