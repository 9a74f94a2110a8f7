//! Error types for tree operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Clone does not match source shape at node {0}")]
    MismatchedCloneShape(String),
}
