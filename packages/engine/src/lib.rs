//! # Pagebloc Engine
//!
//! Tree passes that turn a freshly loaded (or freshly re-rendered) page into
//! an interactive canvas:
//!
//! ```text
//! Registry + stored page data
//!         ↓
//! resolve: placeholder → rendered block subtree
//!         ↓
//! materialize: wrapper policy + attribute transfer
//!         ↓
//! permissions: capability flags per structural role
//!         ↓
//! interactive canvas
//! ```
//!
//! All passes operate on the mirrored [`pagebloc_tree::ComponentNode`] tree
//! and are pure tree transformations: resolution gaps (missing fragments,
//! unknown slugs) default to no-ops rather than errors, since partially
//! rendered pages are a supported state.

mod errors;
mod materialize;
mod permissions;
mod registry;
mod resolve;

pub use errors::RegistryError;
pub use materialize::materialize_blocks;
pub use permissions::{
    deny_layout_access, restrict_edit_access, NoComputedStyles, StyleProbe, EDITABLE_TAGS,
};
pub use registry::{BlockDefinition, BlockRegistry, SettingDescriptor};
pub use resolve::{resolve_placeholders, RenderedBlocks};
