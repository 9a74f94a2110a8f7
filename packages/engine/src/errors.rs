//! Error types for the engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Block slug already registered: {0}")]
    DuplicateSlug(String),
}
