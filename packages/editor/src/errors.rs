//! Error types for the editor

use pagebloc_engine::RegistryError;
use pagebloc_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Render request failed: {0}")]
    RenderFailed(#[from] crate::render::RenderError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Unknown language variant: {0}")]
    UnknownLanguage(String),

    #[error("Page has no content container")]
    MissingContentContainer,
}
