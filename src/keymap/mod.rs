//! Physical key combinations, bindings and matching
//!
//! This module provides the data side of the binding overlay:
//! - Physical keys and unordered combinations of them
//! - Bindings from combinations to logical actions, generic over the action set
//! - Built-in default bindings per scope, embedded from YAML
//! - Matching held keys against a binding list
//!
//! # Architecture
//!
//! ```text
//! InputKey press → KeyBindingMatcher::press(key, resolver.effective_bindings()) → ActionEvent<A>
//! ```
//!
//! # Loading Defaults
//!
//! ```ignore
//! // Embedded defaults
//! let defaults = global_defaults();
//!
//! // Or from a YAML file
//! let defaults = StaticDefaults::<GlobalAction>::from_file(Path::new("defaults.yaml"))?;
//! ```

mod action;
mod binding;
mod config;
mod defaults;
mod matcher;
mod types;

pub use action::{Action, GameplayAction, GlobalAction, UnknownAction};
pub use binding::KeyBinding;
pub use config::{
    load_keymap_file, parse_combination, parse_input_key, parse_keymap_yaml, to_keymap_yaml,
    BindingConfig, KeymapConfig, KeymapError, ScopedBinding,
};
pub use defaults::{
    default_global_bindings, gameplay_defaults, global_defaults, DefaultBindingProvider,
    StaticDefaults,
};
pub use matcher::{
    matching_bindings, ActionEvent, KeyBindingMatcher, MatchingMode, MatchingOptions,
    SimultaneousMode,
};
pub use types::{InputKey, KeyCombination};

#[cfg(test)]
mod tests;
