//! Integration tests for the keymap system

use super::*;
use crate::scope::{RulesetId, RulesetInfo};

/// Embedded default keymap YAML for testing
const GLOBAL_DEFAULTS_YAML: &str = include_str!("../../defaults/global.yaml");
const GAMEPLAY_DEFAULTS_YAML: &str = include_str!("../../defaults/gameplay.yaml");

fn cmd() -> InputKey {
    if cfg!(target_os = "macos") {
        InputKey::Super
    } else {
        InputKey::Control
    }
}

#[test]
fn test_embedded_global_yaml_parses() {
    let bindings = parse_keymap_yaml::<GlobalAction>(GLOBAL_DEFAULTS_YAML)
        .expect("Embedded global defaults should parse successfully");

    assert!(!bindings.is_empty(), "Should have bindings");
    assert!(bindings.iter().all(|b| b.ruleset.is_none()));

    let has_save = bindings.iter().any(|b| b.binding.action == GlobalAction::Save);
    let has_back = bindings.iter().any(|b| b.binding.action == GlobalAction::Back);
    assert!(has_save, "Should have Save binding");
    assert!(has_back, "Should have Back binding");
}

#[test]
fn test_embedded_gameplay_yaml_parses() {
    let bindings = parse_keymap_yaml::<GameplayAction>(GAMEPLAY_DEFAULTS_YAML)
        .expect("Embedded gameplay defaults should parse successfully");
    assert!(bindings.iter().all(|b| b.ruleset.is_some() && b.variant.is_some()));
}

#[test]
fn test_embedded_matches_hardcoded_save() {
    let embedded = global_defaults().defaults_for(None, None);
    let hardcoded = default_global_bindings();

    let save = |bindings: &[KeyBinding<GlobalAction>]| {
        bindings
            .iter()
            .find(|b| b.action == GlobalAction::Save)
            .map(|b| b.combination.clone())
    };
    assert_eq!(save(&embedded), save(&hardcoded));
}

#[test]
fn test_global_save_lookup() {
    let bindings = global_defaults().defaults_for(None, None);
    let pressed = KeyCombination::new([cmd(), InputKey::Char('s')]);
    let matched = matching_bindings(&bindings, &pressed, MatchingOptions::default());
    assert_eq!(matched[0].action, GlobalAction::Save);
}

#[test]
fn test_global_save_as_beats_save() {
    let bindings = global_defaults().defaults_for(None, None);
    let pressed = KeyCombination::new([cmd(), InputKey::Shift, InputKey::Char('s')]);
    let matched = matching_bindings(&bindings, &pressed, MatchingOptions::default());
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].action, GlobalAction::SaveAs);
}

#[test]
fn test_mania_variants_differ() {
    let defaults = gameplay_defaults();
    let mania = RulesetInfo::new(RulesetId(3), "mania");

    let two = defaults.defaults_for(Some(&mania), Some(2));
    let four = defaults.defaults_for(Some(&mania), Some(4));
    assert_ne!(two, four);
    assert!(four.iter().any(|b| b.action == GameplayAction::Key4));
    assert!(!two.iter().any(|b| b.action == GameplayAction::Key4));
}

#[test]
fn test_gameplay_keys_are_simultaneous() {
    let defaults = gameplay_defaults();
    let taiko = RulesetInfo::new(RulesetId(1), "taiko");
    let bindings = defaults.defaults_for(Some(&taiko), Some(0));

    let options = MatchingOptions::new(SimultaneousMode::Unique, MatchingMode::Any);
    let mut matcher = KeyBindingMatcher::new(options);
    assert_eq!(
        matcher.press(InputKey::Char('d'), &bindings),
        vec![ActionEvent::Pressed(GameplayAction::Key1)]
    );
    assert_eq!(
        matcher.press(InputKey::Char('k'), &bindings),
        vec![ActionEvent::Pressed(GameplayAction::Key4)]
    );
    assert_eq!(
        matcher.pressed_actions(),
        vec![GameplayAction::Key1, GameplayAction::Key4]
    );
}

#[test]
fn test_defaults_yaml_round_trip_through_writer() {
    let bindings = global_defaults().defaults_for(None, None);
    let yaml = to_keymap_yaml(&bindings, None, None).unwrap();
    let reparsed = StaticDefaults::<GlobalAction>::from_yaml(&yaml).unwrap();
    assert_eq!(reparsed.defaults_for(None, None), bindings);
}
