//! # Pagebloc Tree
//!
//! Component-node data model for the page building engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tree: ComponentNode model + identity        │
//! │  - Typed capability flags                   │
//! │  - Opaque markup-attribute map              │
//! │  - Session ids + style identifiers          │
//! │  - Attribute-preserving deep clone          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: resolve / materialize / permissions │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: settings store + update protocol    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The host owns rendering**: this model mirrors the host editor's
//!    component tree and only carries what the engine needs (capability
//!    flags, markup attributes, block metadata).
//! 2. **Typed seams**: capability flags are a struct, markup attributes are
//!    an opaque map. The two are never mixed into one attribute bag.
//! 3. **Explicit edit mode**: every call that writes attributes carries an
//!    [`EditMode`] so programmatic writes can never masquerade as user edits.

mod clone;
mod errors;
mod identity;
mod markup;
mod node;
mod serialize;

pub use clone::{deep_copy_attributes, script_clone, user_duplicate};
pub use errors::TreeError;
pub use identity::{is_style_identifier, IdGenerator, StyleIdGenerator};
pub use markup::{
    ATTR_BLOCKS_CONTAINER, ATTR_BLOCK_ID, ATTR_BLOCK_SLUG, ATTR_CONTENT_CONTAINER, ATTR_CURSOR,
    ATTR_EDITABLE, ATTR_IS_HTML, ATTR_RAW_CONTENT, PLACEHOLDER_TAG,
};
pub use node::{Capabilities, ComponentNode, EditMode};
pub use serialize::serialize_html;
