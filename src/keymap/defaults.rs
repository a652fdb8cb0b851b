//! Built-in default bindings
//!
//! Defaults are a pure function of the scope. Global defaults and the
//! gameplay defaults of the bundled rulesets are embedded at compile time,
//! with hardcoded fallbacks if the embedded YAML fails to parse.

use std::collections::HashMap;
use std::path::Path;

use super::action::{Action, GameplayAction, GlobalAction};
use super::binding::KeyBinding;
use super::config::{load_keymap_file, parse_keymap_yaml, KeymapError, ScopedBinding};
use super::types::InputKey;
use crate::scope::RulesetInfo;

/// Global default keymap YAML embedded at compile time
const GLOBAL_DEFAULTS_YAML: &str = include_str!("../../defaults/global.yaml");

/// Gameplay default keymap YAML embedded at compile time
const GAMEPLAY_DEFAULTS_YAML: &str = include_str!("../../defaults/gameplay.yaml");

/// Supplies the compiled-in default mapping for a scope
pub trait DefaultBindingProvider<A>: Send + Sync {
    /// Default bindings for a ruleset and variant, or the global defaults
    /// when `ruleset` is `None`
    fn defaults_for(&self, ruleset: Option<&RulesetInfo>, variant: Option<i32>)
        -> Vec<KeyBinding<A>>;
}

impl<A, F> DefaultBindingProvider<A> for F
where
    F: Fn(Option<&RulesetInfo>, Option<i32>) -> Vec<KeyBinding<A>> + Send + Sync,
{
    fn defaults_for(
        &self,
        ruleset: Option<&RulesetInfo>,
        variant: Option<i32>,
    ) -> Vec<KeyBinding<A>> {
        self(ruleset, variant)
    }
}

/// A fixed table of default bindings keyed by ruleset short name and variant
///
/// Lookups for a ruleset without a variant use variant 0.
#[derive(Debug, Clone)]
pub struct StaticDefaults<A> {
    global: Vec<KeyBinding<A>>,
    rulesets: HashMap<(String, i32), Vec<KeyBinding<A>>>,
}

impl<A: Action> StaticDefaults<A> {
    pub fn new() -> Self {
        Self {
            global: Vec::new(),
            rulesets: HashMap::new(),
        }
    }

    /// Set the global bindings (builder pattern)
    pub fn with_global(mut self, bindings: Vec<KeyBinding<A>>) -> Self {
        self.global = bindings;
        self
    }

    /// Set the bindings for one ruleset variant (builder pattern)
    pub fn with_ruleset(
        mut self,
        short_name: impl Into<String>,
        variant: i32,
        bindings: Vec<KeyBinding<A>>,
    ) -> Self {
        self.rulesets.insert((short_name.into(), variant), bindings);
        self
    }

    /// Build a table from parsed YAML entries, preserving declaration order
    pub fn from_scoped(entries: Vec<ScopedBinding<A>>) -> Self {
        let mut defaults = Self::new();
        for entry in entries {
            match entry.ruleset {
                None => defaults.global.push(entry.binding),
                Some(name) => defaults
                    .rulesets
                    .entry((name, entry.variant.unwrap_or(0)))
                    .or_default()
                    .push(entry.binding),
            }
        }
        defaults
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, KeymapError> {
        parse_keymap_yaml(yaml).map(Self::from_scoped)
    }

    pub fn from_file(path: &Path) -> Result<Self, KeymapError> {
        load_keymap_file(path).map(Self::from_scoped)
    }

    /// Variants that have defaults for a ruleset, sorted
    pub fn variants_for(&self, short_name: &str) -> Vec<i32> {
        let mut variants: Vec<i32> = self
            .rulesets
            .keys()
            .filter(|(name, _)| name == short_name)
            .map(|(_, variant)| *variant)
            .collect();
        variants.sort_unstable();
        variants
    }
}

impl<A: Action> Default for StaticDefaults<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> DefaultBindingProvider<A> for StaticDefaults<A> {
    fn defaults_for(
        &self,
        ruleset: Option<&RulesetInfo>,
        variant: Option<i32>,
    ) -> Vec<KeyBinding<A>> {
        match ruleset {
            None => self.global.clone(),
            Some(ruleset) => self
                .rulesets
                .get(&(ruleset.short_name.clone(), variant.unwrap_or(0)))
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// Default global bindings from the embedded YAML
pub fn global_defaults() -> StaticDefaults<GlobalAction> {
    match StaticDefaults::from_yaml(GLOBAL_DEFAULTS_YAML) {
        Ok(defaults) => {
            tracing::debug!(
                "Loaded embedded global defaults ({} bindings)",
                defaults.global.len()
            );
            defaults
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded global defaults: {}, using hardcoded defaults",
                e
            );
            StaticDefaults::new().with_global(default_global_bindings())
        }
    }
}

/// Default gameplay bindings for the bundled rulesets from the embedded YAML
pub fn gameplay_defaults() -> StaticDefaults<GameplayAction> {
    match StaticDefaults::from_yaml(GAMEPLAY_DEFAULTS_YAML) {
        Ok(defaults) => defaults,
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded gameplay defaults: {}, using hardcoded defaults",
                e
            );
            StaticDefaults::new().with_ruleset("taiko", 0, default_taiko_bindings())
        }
    }
}

/// Hardcoded global bindings
///
/// Kept as a fallback in case the embedded YAML is broken.
pub fn default_global_bindings() -> Vec<KeyBinding<GlobalAction>> {
    let cmd = if cfg!(target_os = "macos") {
        InputKey::Super
    } else {
        InputKey::Control
    };

    vec![
        KeyBinding::keys([cmd, InputKey::Char('s')], GlobalAction::Save),
        KeyBinding::keys([cmd, InputKey::Shift, InputKey::Char('s')], GlobalAction::SaveAs),
        KeyBinding::keys([cmd, InputKey::Char('z')], GlobalAction::Undo),
        KeyBinding::keys([cmd, InputKey::Shift, InputKey::Char('z')], GlobalAction::Redo),
        KeyBinding::single(InputKey::Escape, GlobalAction::Back),
        KeyBinding::single(InputKey::MouseButton(4), GlobalAction::Back),
        KeyBinding::single(InputKey::Enter, GlobalAction::Select),
        KeyBinding::single(InputKey::NumpadEnter, GlobalAction::Select),
        KeyBinding::single(InputKey::Down, GlobalAction::SelectNext),
        KeyBinding::single(InputKey::Up, GlobalAction::SelectPrevious),
        KeyBinding::keys([cmd, InputKey::Char('o')], GlobalAction::ToggleSettings),
        KeyBinding::single(InputKey::F(8), GlobalAction::ToggleChat),
        KeyBinding::keys([cmd, InputKey::F(4)], GlobalAction::ToggleMute),
        KeyBinding::keys([InputKey::Alt, InputKey::Up], GlobalAction::IncreaseVolume),
        KeyBinding::keys([InputKey::Alt, InputKey::Down], GlobalAction::DecreaseVolume),
        KeyBinding::single(InputKey::F(12), GlobalAction::TakeScreenshot),
        KeyBinding::keys([InputKey::Control, InputKey::Escape], GlobalAction::QuickExit),
    ]
}

fn default_taiko_bindings() -> Vec<KeyBinding<GameplayAction>> {
    vec![
        KeyBinding::single(InputKey::Char('d'), GameplayAction::Key1),
        KeyBinding::single(InputKey::Char('f'), GameplayAction::Key2),
        KeyBinding::single(InputKey::Char('j'), GameplayAction::Key3),
        KeyBinding::single(InputKey::Char('k'), GameplayAction::Key4),
        KeyBinding::single(InputKey::Escape, GameplayAction::Pause),
        KeyBinding::single(InputKey::Space, GameplayAction::SkipCutscene),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::RulesetId;

    #[test]
    fn test_static_defaults_lookup() {
        let defaults = StaticDefaults::new()
            .with_global(vec![KeyBinding::single(InputKey::Escape, GlobalAction::Back)])
            .with_ruleset(
                "osu",
                0,
                vec![KeyBinding::single(InputKey::Char('z'), GlobalAction::Select)],
            );

        assert_eq!(defaults.defaults_for(None, None).len(), 1);

        let osu = RulesetInfo::new(RulesetId(0), "osu");
        let bindings = defaults.defaults_for(Some(&osu), Some(0));
        assert_eq!(bindings[0].action, GlobalAction::Select);

        assert!(defaults.defaults_for(Some(&osu), Some(7)).is_empty());
    }

    #[test]
    fn test_missing_variant_uses_zero() {
        let defaults = gameplay_defaults();
        let taiko = RulesetInfo::transient("taiko");
        assert_eq!(
            defaults.defaults_for(Some(&taiko), None),
            defaults.defaults_for(Some(&taiko), Some(0))
        );
    }

    #[test]
    fn test_closure_provider() {
        let provider = |_: Option<&RulesetInfo>, variant: Option<i32>| {
            vec![KeyBinding::single(
                InputKey::Numpad(variant.unwrap_or(0) as u8),
                GameplayAction::Key1,
            )]
        };
        let bindings = provider.defaults_for(None, Some(3));
        assert!(bindings[0].combination.contains(InputKey::Numpad(3)));
    }

    #[test]
    fn test_variants_for() {
        assert_eq!(gameplay_defaults().variants_for("mania"), vec![2, 4]);
    }
}
