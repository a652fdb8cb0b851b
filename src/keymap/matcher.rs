//! Matching held keys against a binding list
//!
//! [`matching_bindings`] is the pure lookup: given a mapping snapshot and the
//! set of held keys, which bindings are active. [`KeyBindingMatcher`] wraps it
//! with press/release state and reports which actions start and stop.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::binding::KeyBinding;
use super::types::{InputKey, KeyCombination};

/// How a binding's combination is compared against the held keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// The held keys must equal the combination
    Exact,
    /// The combination must be a subset of the held keys
    #[default]
    Any,
}

/// How many bindings may be active at once
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimultaneousMode {
    /// At most one binding; the most specific combination wins
    #[default]
    None,
    /// Several bindings, but each action only once
    Unique,
    /// Every matching binding
    All,
}

/// Matching policy for one input context
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchingOptions {
    #[serde(default)]
    pub simultaneous: SimultaneousMode,
    #[serde(default)]
    pub matching: MatchingMode,
}

impl MatchingOptions {
    pub const fn new(simultaneous: SimultaneousMode, matching: MatchingMode) -> Self {
        Self {
            simultaneous,
            matching,
        }
    }
}

impl KeyCombination {
    /// Check if this combination is satisfied by the held keys
    ///
    /// The empty combination is never satisfied.
    pub fn is_pressed(&self, pressed: &KeyCombination, mode: MatchingMode) -> bool {
        if self.is_empty() {
            return false;
        }
        match mode {
            MatchingMode::Exact => self == pressed,
            MatchingMode::Any => self.is_subset_of(pressed),
        }
    }
}

/// Find the bindings that are active for the held keys
///
/// Results follow mapping order, except under [`SimultaneousMode::None`]
/// where only the binding with the largest combination is returned (the
/// earliest one on ties).
pub fn matching_bindings<'a, A: Action>(
    bindings: &'a [KeyBinding<A>],
    pressed: &KeyCombination,
    options: MatchingOptions,
) -> Vec<&'a KeyBinding<A>> {
    let matches = bindings
        .iter()
        .filter(|b| b.combination.is_pressed(pressed, options.matching));

    match options.simultaneous {
        SimultaneousMode::None => {
            let mut best: Option<&KeyBinding<A>> = None;
            for binding in matches {
                if best.map_or(true, |b| binding.combination.len() > b.combination.len()) {
                    best = Some(binding);
                }
            }
            best.into_iter().collect()
        }
        SimultaneousMode::Unique => {
            let mut result: Vec<&KeyBinding<A>> = Vec::new();
            for binding in matches {
                if !result.iter().any(|b| b.action == binding.action) {
                    result.push(binding);
                }
            }
            result
        }
        SimultaneousMode::All => matches.collect(),
    }
}

/// Result of a key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent<A> {
    /// The action became active
    Pressed(A),
    /// The action is no longer active
    Released(A),
}

/// Tracks held keys and active bindings across input events
///
/// The mapping is passed on every event so a live-reloaded snapshot is
/// always the one consulted.
#[derive(Debug, Clone)]
pub struct KeyBindingMatcher<A> {
    options: MatchingOptions,
    pressed_keys: KeyCombination,
    /// Bindings currently held, in the order they were pressed
    active: Vec<KeyBinding<A>>,
}

impl<A: Action> KeyBindingMatcher<A> {
    pub fn new(options: MatchingOptions) -> Self {
        Self {
            options,
            pressed_keys: KeyCombination::none(),
            active: Vec::new(),
        }
    }

    pub fn options(&self) -> MatchingOptions {
        self.options
    }

    pub fn pressed_keys(&self) -> &KeyCombination {
        &self.pressed_keys
    }

    /// Actions currently held, without duplicates, in press order
    pub fn pressed_actions(&self) -> Vec<A> {
        let mut actions = Vec::new();
        for binding in &self.active {
            if !actions.contains(&binding.action) {
                actions.push(binding.action);
            }
        }
        actions
    }

    /// Forget all held keys without reporting releases
    pub fn reset(&mut self) {
        self.pressed_keys.clear();
        self.active.clear();
    }

    /// Handle a key going down
    pub fn press(&mut self, key: InputKey, bindings: &[KeyBinding<A>]) -> Vec<ActionEvent<A>> {
        if !self.pressed_keys.insert(key) {
            return Vec::new();
        }

        let mut events = Vec::new();

        // Bindings held under a previous key state may stop matching, e.g.
        // `Ctrl+S` under exact matching once Shift joins.
        self.release_unmatched(&mut events);

        // Unique still tracks every matching binding so an action stays held
        // until the last of its bindings is released.
        let lookup = match self.options.simultaneous {
            SimultaneousMode::Unique => {
                MatchingOptions::new(SimultaneousMode::All, self.options.matching)
            }
            _ => self.options,
        };
        let matched = matching_bindings(bindings, &self.pressed_keys, lookup);
        let newly: Vec<KeyBinding<A>> = matched
            .into_iter()
            .filter(|b| !self.active.contains(*b))
            .cloned()
            .collect();

        match self.options.simultaneous {
            SimultaneousMode::None => {
                if let Some(winner) = newly.into_iter().next() {
                    for previous in self.active.drain(..) {
                        events.push(ActionEvent::Released(previous.action));
                    }
                    events.push(ActionEvent::Pressed(winner.action));
                    self.active.push(winner);
                }
            }
            SimultaneousMode::Unique => {
                for binding in newly {
                    if !self.active.iter().any(|b| b.action == binding.action) {
                        events.push(ActionEvent::Pressed(binding.action));
                    }
                    self.active.push(binding);
                }
            }
            SimultaneousMode::All => {
                for binding in newly {
                    events.push(ActionEvent::Pressed(binding.action));
                    self.active.push(binding);
                }
            }
        }

        events
    }

    /// Handle a key going up
    ///
    /// Held bindings that no longer match are released. Releasing never
    /// starts a new action.
    pub fn release(&mut self, key: InputKey) -> Vec<ActionEvent<A>> {
        if !self.pressed_keys.remove(key) {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.release_unmatched(&mut events);
        events
    }

    fn release_unmatched(&mut self, events: &mut Vec<ActionEvent<A>>) {
        let mut index = 0;
        while index < self.active.len() {
            if self.active[index]
                .combination
                .is_pressed(&self.pressed_keys, self.options.matching)
            {
                index += 1;
                continue;
            }

            let released = self.active.remove(index);
            let still_held = self.active.iter().any(|b| b.action == released.action);
            let report = match self.options.simultaneous {
                SimultaneousMode::All | SimultaneousMode::None => true,
                SimultaneousMode::Unique => !still_held,
            };
            if report {
                events.push(ActionEvent::Released(released.action));
            }
        }
    }
}

impl<A: Action> Default for KeyBindingMatcher<A> {
    fn default() -> Self {
        Self::new(MatchingOptions::default())
    }
}
