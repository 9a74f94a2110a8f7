//! Markup attribute names and tags shared with the render service.
//!
//! These are part of the wire format: the server emits them when rendering
//! blocks and the engine recognizes them while walking the tree.

/// Tag of an unresolved block placeholder node.
pub const PLACEHOLDER_TAG: &str = "phpb-block";

/// Marks the single boundary between layout chrome and editable content.
pub const ATTR_CONTENT_CONTAINER: &str = "phpb-content-container";

/// Marks a slot that itself accepts dropped blocks.
pub const ATTR_BLOCKS_CONTAINER: &str = "phpb-blocks-container";

/// Marks a node as text-editable regardless of its tag.
pub const ATTR_EDITABLE: &str = "phpb-editable";

/// Whether a block's markup is directly editable ("true") or server-owned.
pub const ATTR_IS_HTML: &str = "is-html";

/// Block instance id carried on rendered block roots.
pub const ATTR_BLOCK_ID: &str = "block-id";

/// Block template slug carried on rendered block roots.
pub const ATTR_BLOCK_SLUG: &str = "block-slug";

/// Set on text-editable nodes so the text editor keeps raw markup intact.
pub const ATTR_RAW_CONTENT: &str = "data-raw-content";

/// Cursor hint set on dynamic block roots (no text cursor over opaque markup).
pub const ATTR_CURSOR: &str = "data-cursor";
