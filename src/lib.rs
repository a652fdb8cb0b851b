//! rebind - resolved input binding overlay
//!
//! This crate decides, for one input context (the global context or a
//! ruleset layout variant), which key combinations map to which actions:
//! user overrides persisted in a store, or built-in defaults when the store
//! cannot be consulted. A controller keeps the mapping live while the store
//! changes underneath it.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod controller;
pub mod error;
pub mod keymap;
pub mod resolver;
pub mod scope;
pub mod store;
pub mod tracing;

// Re-export commonly used types
pub use config::RebindConfig;
pub use controller::{BindingController, ControllerState};
pub use error::{BindingError, StoreError};
pub use keymap::{Action, InputKey, KeyBinding, KeyCombination, MatchingOptions};
pub use resolver::{BindingResolver, FallbackReason, Resolution};
pub use scope::{RulesetId, RulesetInfo, Scope};
pub use store::{BindingStore, KeyBindingStore};
