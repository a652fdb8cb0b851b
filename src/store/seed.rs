//! Seeding the store with default bindings
//!
//! The resolver never falls back to defaults for a durable scope, so a
//! fresh store has to be seeded before the defaults take effect. Seeding is
//! additive: for each action, only the defaults beyond the number of
//! bindings already persisted for it are inserted. An action the user has
//! rebound keeps the user's binding.

use std::collections::HashMap;

use super::memory::KeyBindingStore;
use crate::error::StoreError;
use crate::keymap::{Action, KeyBinding};
use crate::scope::Scope;

/// Insert missing default bindings for a scope
///
/// Returns the number of records inserted. Scopes without a durable ruleset
/// identity are left alone, since their bindings can never be looked up.
pub fn seed_defaults<A: Action>(
    store: &KeyBindingStore,
    scope: &Scope,
    defaults: &[KeyBinding<A>],
) -> Result<usize, StoreError> {
    let Some((ruleset_id, variant)) = scope.store_key() else {
        tracing::debug!("Not seeding {}: ruleset has no durable identity", scope);
        return Ok(0);
    };

    let mut tx = store.begin_write()?;

    let mut persisted: HashMap<String, usize> = HashMap::new();
    for record in tx.query(ruleset_id, variant) {
        *persisted.entry(record.action.clone()).or_default() += 1;
    }

    let mut seen: HashMap<A, usize> = HashMap::new();
    let mut inserted = 0;
    for binding in defaults {
        let index = seen.entry(binding.action).or_default();
        let existing = persisted
            .get(&binding.action.to_string())
            .copied()
            .unwrap_or(0);
        if *index >= existing {
            tx.insert(ruleset_id, variant, binding.combination.clone(), binding.action);
            inserted += 1;
        }
        *index += 1;
    }

    if inserted > 0 {
        tracing::info!("Seeded {} default bindings for {}", inserted, scope);
    }
    tx.commit()?;
    Ok(inserted)
}

/// Replace a scope's records with its defaults
pub fn reset_to_defaults<A: Action>(
    store: &KeyBindingStore,
    scope: &Scope,
    defaults: &[KeyBinding<A>],
) -> Result<(), StoreError> {
    let Some((ruleset_id, variant)) = scope.store_key() else {
        return Ok(());
    };

    let mut tx = store.begin_write()?;
    tx.replace_scope(
        ruleset_id,
        variant,
        defaults
            .iter()
            .map(|b| (b.combination.clone(), b.action)),
    );
    tx.commit()?;
    tracing::info!("Reset {} to {} default bindings", scope, defaults.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{GlobalAction, InputKey, KeyCombination};
    use crate::scope::{RulesetInfo, RulesetId};
    use crate::store::{BindingStore, ReadTransaction};

    fn defaults() -> Vec<KeyBinding<GlobalAction>> {
        vec![
            KeyBinding::single(InputKey::Enter, GlobalAction::Select),
            KeyBinding::single(InputKey::NumpadEnter, GlobalAction::Select),
            KeyBinding::single(InputKey::Escape, GlobalAction::Back),
        ]
    }

    fn global_actions(store: &KeyBindingStore) -> Vec<String> {
        let read = store.begin_read().unwrap();
        read.query(None, None)
            .into_iter()
            .map(|r| format!("{}={}", r.combination, r.action))
            .collect()
    }

    #[test]
    fn test_seed_empty_store() {
        let store = KeyBindingStore::in_memory();
        assert_eq!(seed_defaults(&store, &Scope::global(), &defaults()).unwrap(), 3);
        assert_eq!(global_actions(&store).len(), 3);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = KeyBindingStore::in_memory();
        seed_defaults(&store, &Scope::global(), &defaults()).unwrap();
        assert_eq!(seed_defaults(&store, &Scope::global(), &defaults()).unwrap(), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_seed_keeps_user_bindings() {
        let store = KeyBindingStore::in_memory();
        let mut tx = store.begin_write().unwrap();
        tx.insert(None, None, KeyCombination::single(InputKey::Space), "Select");
        tx.commit().unwrap();

        // One Select is already persisted, so only the second default is added
        assert_eq!(seed_defaults(&store, &Scope::global(), &defaults()).unwrap(), 2);
        assert_eq!(
            global_actions(&store),
            vec!["Space=Select", "NumEnter=Select", "Escape=Back"]
        );
    }

    #[test]
    fn test_seed_skips_transient_ruleset() {
        let store = KeyBindingStore::in_memory();
        let scope = Scope::ruleset(RulesetInfo::transient("custom"), 0);
        assert_eq!(seed_defaults(&store, &scope, &defaults()).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset_to_defaults() {
        let store = KeyBindingStore::in_memory();
        let scope = Scope::ruleset(RulesetInfo::new(RulesetId(1), "osu"), 0);
        let mut tx = store.begin_write().unwrap();
        tx.insert(Some(RulesetId(1)), Some(0), KeyCombination::single(InputKey::Space), "Back");
        tx.insert(None, None, KeyCombination::single(InputKey::Space), "Select");
        tx.commit().unwrap();

        reset_to_defaults(&store, &scope, &defaults()).unwrap();

        let read = store.begin_read().unwrap();
        let scoped = read.query(Some(RulesetId(1)), Some(0));
        assert_eq!(scoped.len(), 3);
        assert_eq!(scoped[0].action, "Select");
        assert_eq!(read.query(None, None).len(), 1);
    }
}
