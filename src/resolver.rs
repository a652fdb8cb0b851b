//! Resolving the effective bindings for one scope
//!
//! The effective mapping is either the persisted overrides for the scope or,
//! when the scope's ruleset has no durable identity, the built-in defaults.
//!
//! ```text
//! recompute()
//!   ├─ ruleset without durable id → defaults_for(ruleset, variant)
//!   └─ otherwise → begin_read → query(ruleset_id, variant) → detach → close
//!        → publish (replaces the previous snapshot)
//! ```
//!
//! An empty persisted set is published as-is: "no overrides" is not the same
//! as "cannot look overrides up". A store failure publishes nothing.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::BindingError;
use crate::keymap::{
    matching_bindings, Action, DefaultBindingProvider, KeyBinding, KeyBindingMatcher,
    KeyCombination, MatchingOptions,
};
use crate::scope::Scope;
use crate::store::{BindingStore, ReadTransaction};

/// Why the defaults were used instead of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The ruleset was never persisted, so overrides can't be associated with it
    UnidentifiableRuleset,
}

/// Outcome of a successful [`BindingResolver::recompute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Published the persisted records for the scope (possibly none)
    Persisted { count: usize },
    /// Published the built-in defaults
    Defaults { reason: FallbackReason, count: usize },
}

impl Resolution {
    pub fn count(&self) -> usize {
        match *self {
            Resolution::Persisted { count } | Resolution::Defaults { count, .. } => count,
        }
    }
}

/// Holds the effective bindings for one scope and recomputes them on demand
///
/// Reads are served from the last published snapshot and never wait on a
/// recompute in progress. Recomputes are serialized per resolver.
pub struct BindingResolver<A, S> {
    scope: Scope,
    options: MatchingOptions,
    store: Arc<S>,
    defaults: Arc<dyn DefaultBindingProvider<A>>,
    /// Last published snapshot
    effective: RwLock<Arc<[KeyBinding<A>]>>,
    /// Serializes recomputes
    recompute_lock: Mutex<()>,
    generation: AtomicU64,
}

impl<A: Action, S: BindingStore> BindingResolver<A, S> {
    /// Create a resolver with an empty effective mapping
    ///
    /// Fails with [`BindingError::InvalidScope`] if the scope names a ruleset
    /// without a variant.
    pub fn new(
        scope: Scope,
        store: Arc<S>,
        defaults: Arc<dyn DefaultBindingProvider<A>>,
        options: MatchingOptions,
    ) -> Result<Self, BindingError> {
        scope.validate()?;

        Ok(Self {
            scope,
            options,
            store,
            defaults,
            effective: RwLock::new(Arc::from(Vec::new())),
            recompute_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn options(&self) -> MatchingOptions {
        self.options
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The current effective mapping
    pub fn effective_bindings(&self) -> Arc<[KeyBinding<A>]> {
        Arc::clone(&self.effective.read())
    }

    /// Replace the effective mapping directly, bypassing the store
    pub fn set_effective_bindings(&self, bindings: Vec<KeyBinding<A>>) {
        let _guard = self.recompute_lock.lock();
        self.publish(bindings);
    }

    /// Number of mappings published so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The built-in defaults for this resolver's scope
    pub fn default_bindings(&self) -> Vec<KeyBinding<A>> {
        self.defaults
            .defaults_for(self.scope.ruleset.as_ref(), self.scope.variant)
    }

    /// Recompute and publish the effective mapping
    ///
    /// On [`BindingError::StoreUnavailable`] the previous mapping stays in
    /// effect.
    pub fn recompute(&self) -> Result<Resolution, BindingError> {
        let _guard = self.recompute_lock.lock();

        let Some((ruleset_id, variant)) = self.scope.store_key() else {
            let defaults = self.default_bindings();
            let count = defaults.len();
            tracing::debug!(
                scope = %self.scope,
                count,
                "Ruleset has no durable identity, using default bindings"
            );
            self.publish(defaults);
            return Ok(Resolution::Defaults {
                reason: FallbackReason::UnidentifiableRuleset,
                count,
            });
        };

        let bindings = self.read_persisted(ruleset_id, variant).map_err(|e| {
            tracing::warn!(scope = %self.scope, "Keeping previous bindings: {}", e);
            e
        })?;

        let count = bindings.len();
        tracing::debug!(scope = %self.scope, count, "Resolved persisted bindings");
        self.publish(bindings);
        Ok(Resolution::Persisted { count })
    }

    /// One bounded read transaction; only detached copies leave it
    fn read_persisted(
        &self,
        ruleset_id: Option<crate::scope::RulesetId>,
        variant: Option<i32>,
    ) -> Result<Vec<KeyBinding<A>>, BindingError> {
        let tx = self.store.begin_read()?;

        let records = tx.query(ruleset_id, variant);
        let mut bindings = Vec::with_capacity(records.len());
        for record in records {
            match record.detach::<A>() {
                Some(binding) => bindings.push(binding),
                None => tracing::warn!(
                    scope = %self.scope,
                    "Skipping binding {} with unknown action '{}'",
                    record.id,
                    record.action
                ),
            }
        }

        drop(tx);
        Ok(bindings)
    }

    fn publish(&self, bindings: Vec<KeyBinding<A>>) {
        *self.effective.write() = Arc::from(bindings);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Actions active for the held keys under this resolver's matching policy
    pub fn actions_for(&self, pressed: &KeyCombination) -> Vec<A> {
        let snapshot = self.effective_bindings();
        matching_bindings(&snapshot, pressed, self.options)
            .into_iter()
            .map(|b| b.action)
            .collect()
    }

    /// A press/release tracker using this resolver's matching policy
    pub fn matcher(&self) -> KeyBindingMatcher<A> {
        KeyBindingMatcher::new(self.options)
    }

    /// Display strings for every combination bound to an action
    pub fn readable_combinations_for(&self, action: A) -> Vec<String> {
        self.effective_bindings()
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.display_string())
            .collect()
    }
}

impl<A: Action, S> fmt::Debug for BindingResolver<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingResolver")
            .field("scope", &self.scope)
            .field("options", &self.options)
            .field("bindings", &self.effective.read().len())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}
