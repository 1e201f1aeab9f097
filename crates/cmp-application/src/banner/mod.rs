//! Banner lifecycle
//!
//! Discovery of the banner root, resolution of its controls to canonical
//! actions, and the controller state machine tying them together.

pub mod actions;
pub mod controller;
pub mod discovery;

pub use actions::{
    ActionBinding, classify_control, find_preferences_panel, read_preferences, resolve_actions,
};
pub use controller::{BannerLifecycleController, ControllerDeps};
pub use discovery::{BannerLocator, DiscoveredBanner, DiscoveryBudget, HEURISTIC_SCORE_THRESHOLD};
