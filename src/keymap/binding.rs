//! KeyBinding struct representing a mapping from a key combination to an action

use super::action::Action;
use super::types::{InputKey, KeyCombination};

/// A single binding mapping a physical combination to an action
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding<A> {
    /// The keys that must be held together
    pub combination: KeyCombination,
    /// The action to trigger
    pub action: A,
}

impl<A: Action> KeyBinding<A> {
    pub fn new(combination: KeyCombination, action: A) -> Self {
        Self {
            combination,
            action,
        }
    }

    /// Create a binding from a list of keys
    pub fn keys(keys: impl IntoIterator<Item = InputKey>, action: A) -> Self {
        Self::new(KeyCombination::new(keys), action)
    }

    /// Create a single-key binding
    pub fn single(key: InputKey, action: A) -> Self {
        Self::new(KeyCombination::single(key), action)
    }

    /// Get display string for this binding's combination
    pub fn display_string(&self) -> String {
        self.combination.display_string()
    }
}
