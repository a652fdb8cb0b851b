//! Persisted binding overrides
//!
//! The store owns every persisted record. Readers open a transaction, query
//! it, and detach owned copies before the transaction closes:
//!
//! ```text
//! begin_read() → query(ruleset, variant) → &StoredBinding → detach() → KeyBinding<A>
//! ```
//!
//! Record references borrow the transaction, so nothing obtained from a
//! query can outlive it. Changes are announced through a payload-free
//! [`ChangeSignal`].

mod file;
mod memory;
mod seed;
mod signal;
mod watcher;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::keymap::{Action, KeyBinding, KeyCombination};
use crate::scope::RulesetId;

pub use file::{load_store_file, save_store_file, StoreDocument};
pub use memory::{KeyBindingStore, MemoryRead, WriteTransaction};
pub use seed::{reset_to_defaults, seed_defaults};
pub use signal::{ChangeSignal, Subscription};
pub use watcher::StoreWatcher;

/// A persisted override, as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBinding {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset_id: Option<RulesetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<i32>,
    #[serde(rename = "key")]
    pub combination: KeyCombination,
    /// Action name, parsed by whoever detaches the record
    pub action: String,
}

impl StoredBinding {
    /// Check if this record belongs to the given scope key
    ///
    /// A `None` ruleset id only matches global records.
    pub fn belongs_to(&self, ruleset_id: Option<RulesetId>, variant: Option<i32>) -> bool {
        self.ruleset_id == ruleset_id && self.variant == variant
    }

    /// Copy the record out as a binding of action type `A`
    ///
    /// Returns `None` if the action name is not part of `A`.
    pub fn detach<A: Action>(&self) -> Option<KeyBinding<A>> {
        let action = self.action.parse::<A>().ok()?;
        Some(KeyBinding::new(self.combination.clone(), action))
    }
}

/// A read transaction over the store
pub trait ReadTransaction {
    /// All records for a scope key, in store order
    fn query(&self, ruleset_id: Option<RulesetId>, variant: Option<i32>) -> Vec<&StoredBinding>;
}

/// A transactional store of binding overrides
pub trait BindingStore: Send + Sync + 'static {
    type Read<'a>: ReadTransaction
    where
        Self: 'a;

    /// Open a read transaction; it is released when dropped
    fn begin_read(&self) -> Result<Self::Read<'_>, StoreError>;

    /// Fires after every committed change
    fn change_signal(&self) -> &ChangeSignal;
}
