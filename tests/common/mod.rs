//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rebind::keymap::{
    DefaultBindingProvider, GameplayAction, GlobalAction, KeyBinding, StaticDefaults,
};
use rebind::store::{ChangeSignal, MemoryRead};
use rebind::{
    BindingResolver, BindingStore, KeyBindingStore, KeyCombination, MatchingOptions,
    RulesetId, RulesetInfo, Scope, StoreError,
};

/// Parse a combination like "ctrl+shift+s"
pub fn combo(s: &str) -> KeyCombination {
    s.parse().unwrap()
}

pub fn binding<A: rebind::Action>(keys: &str, action: A) -> KeyBinding<A> {
    KeyBinding::new(combo(keys), action)
}

/// A durable mania scope
pub fn mania(variant: i32) -> Scope {
    Scope::ruleset(RulesetInfo::new(RulesetId(3), "mania"), variant)
}

/// A mania scope whose ruleset was never persisted
pub fn transient_mania(variant: i32) -> Scope {
    Scope::ruleset(RulesetInfo::transient("mania"), variant)
}

pub fn global_defaults() -> Arc<dyn DefaultBindingProvider<GlobalAction>> {
    Arc::new(StaticDefaults::new().with_global(vec![
        binding("ctrl+s", GlobalAction::Save),
        binding("ctrl+z", GlobalAction::Undo),
    ]))
}

pub fn mania_defaults() -> Arc<dyn DefaultBindingProvider<GameplayAction>> {
    Arc::new(StaticDefaults::new().with_ruleset(
        "mania",
        4,
        vec![
            binding("d", GameplayAction::Key1),
            binding("f", GameplayAction::Key2),
            binding("j", GameplayAction::Key3),
            binding("k", GameplayAction::Key4),
        ],
    ))
}

pub fn global_resolver<S: BindingStore>(store: Arc<S>) -> Arc<BindingResolver<GlobalAction, S>> {
    Arc::new(
        BindingResolver::new(
            Scope::global(),
            store,
            global_defaults(),
            MatchingOptions::default(),
        )
        .unwrap(),
    )
}

/// Insert one record and commit
pub fn persist<A: rebind::Action>(
    store: &KeyBindingStore,
    scope: &Scope,
    keys: &str,
    action: A,
) -> u64 {
    let (ruleset_id, variant) = scope.store_key().unwrap();
    let mut tx = store.begin_write().unwrap();
    let id = tx.insert(ruleset_id, variant, combo(keys), action);
    tx.commit().unwrap();
    id
}

/// (combination, action) pairs of a mapping, for compact assertions
pub fn pairs<A: rebind::Action>(bindings: &[KeyBinding<A>]) -> Vec<(KeyCombination, A)> {
    bindings
        .iter()
        .map(|b| (b.combination.clone(), b.action))
        .collect()
}

/// A store wrapper that counts read transactions
#[derive(Default)]
pub struct CountingStore {
    pub inner: KeyBindingStore,
    reads: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl BindingStore for CountingStore {
    type Read<'a> = MemoryRead<'a>;

    fn begin_read(&self) -> Result<Self::Read<'_>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.begin_read()
    }

    fn change_signal(&self) -> &ChangeSignal {
        self.inner.change_signal()
    }
}
