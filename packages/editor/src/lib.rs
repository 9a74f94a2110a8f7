//! # Pagebloc Editor
//!
//! The client-side editing engine: it mirrors the host editor's component
//! tree, keeps per-language block settings, and drives the incremental
//! update protocol against the render/persistence collaborator.
//!
//! Event flow for a user setting edit:
//!
//! ```text
//! host attribute edit
//!   → resolve refreshable ancestor + relative-id trail   (address)
//!   → snapshot settings state, POST to render service    (render, store)
//!   → splice fragment, resolve + materialize + restrict  (session)
//!   → re-select via the relative-id trail                (address)
//! ```
//!
//! Failures in the round-trip leave the canvas, the store, and the
//! selection exactly as they were when the request went out.

pub mod address;
pub mod errors;
pub mod history;
pub mod render;
pub mod session;
pub mod settings;
pub mod store;

pub use address::{find_by_address, resolve_address, resolve_refresh_target, BlockAddress, RefreshTarget};
pub use errors::EditorError;
pub use history::{EditHistory, SettingEdit};
pub use render::{RenderError, RenderService, RenderedBlock};
pub use session::{EditSession, PageLoad, SelectionInfo, SelectionPanel, UpdateOutcome};
pub use settings::apply_stored_settings;
pub use store::{BlockState, PageStateData, SettingsStore};

pub use pagebloc_tree::EditMode;
