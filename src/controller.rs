//! Keeping a resolver in sync with its store
//!
//! ```text
//! Inactive ──activate()──▶ Active ──teardown()──▶ TornDown
//!     └───────────────teardown()───────────────────┘
//! ```
//!
//! While `Active` the controller holds exactly one subscription to the
//! store's change signal and recomputes the resolver on every notification.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::BindingError;
use crate::keymap::Action;
use crate::resolver::BindingResolver;
use crate::store::{BindingStore, Subscription};

/// Lifecycle state of a [`BindingController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Inactive,
    Active,
    TornDown,
}

enum Lifecycle {
    Inactive,
    Active(Subscription),
    TornDown,
}

impl Lifecycle {
    fn state(&self) -> ControllerState {
        match self {
            Lifecycle::Inactive => ControllerState::Inactive,
            Lifecycle::Active(_) => ControllerState::Active,
            Lifecycle::TornDown => ControllerState::TornDown,
        }
    }
}

struct Shared<A, S> {
    resolver: Arc<BindingResolver<A, S>>,
    /// Held by teardown and by every change handler, so once teardown
    /// returns no handler can recompute.
    lifecycle: Mutex<Lifecycle>,
}

impl<A: Action, S: BindingStore> Shared<A, S> {
    fn on_store_changed(&self) {
        let lifecycle = self.lifecycle.lock();
        if !matches!(*lifecycle, Lifecycle::Active(_)) {
            return;
        }

        tracing::debug!(scope = %self.resolver.scope(), "Binding store changed, reloading");
        if let Err(e) = self.resolver.recompute() {
            tracing::warn!(
                scope = %self.resolver.scope(),
                "Failed to reload bindings after store change: {}",
                e
            );
        }
    }
}

/// Subscribes a resolver to its store's change signal
///
/// Dropping the controller tears it down.
pub struct BindingController<A: Action, S: BindingStore> {
    shared: Arc<Shared<A, S>>,
}

impl<A: Action, S: BindingStore> BindingController<A, S> {
    pub fn new(resolver: Arc<BindingResolver<A, S>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                resolver,
                lifecycle: Mutex::new(Lifecycle::Inactive),
            }),
        }
    }

    pub fn resolver(&self) -> &Arc<BindingResolver<A, S>> {
        &self.shared.resolver
    }

    pub fn state(&self) -> ControllerState {
        self.shared.lifecycle.lock().state()
    }

    pub fn is_subscribed(&self) -> bool {
        self.state() == ControllerState::Active
    }

    /// Subscribe to store changes and seed the effective mapping
    ///
    /// A no-op when already active or torn down. If seeding fails the
    /// controller still becomes active, so the next store change retries,
    /// and the error is returned.
    pub fn activate(&self) -> Result<(), BindingError> {
        let mut lifecycle = self.shared.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Active(_) => return Ok(()),
            Lifecycle::TornDown => {
                tracing::debug!("Ignoring activate() on a torn down binding controller");
                return Ok(());
            }
            Lifecycle::Inactive => {}
        }

        let weak: Weak<Shared<A, S>> = Arc::downgrade(&self.shared);
        let subscription = self
            .shared
            .resolver
            .store()
            .change_signal()
            .subscribe(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_store_changed();
                }
            });
        *lifecycle = Lifecycle::Active(subscription);

        tracing::debug!(scope = %self.shared.resolver.scope(), "Binding controller activated");
        self.shared.resolver.recompute().map(|_| ())
    }

    /// Unsubscribe and stop reacting to store changes; idempotent
    pub fn teardown(&self) {
        let previous = std::mem::replace(&mut *self.shared.lifecycle.lock(), Lifecycle::TornDown);
        if let Lifecycle::Active(subscription) = previous {
            subscription.unsubscribe();
            tracing::debug!(
                scope = %self.shared.resolver.scope(),
                "Binding controller torn down"
            );
        }
    }
}

impl<A: Action, S: BindingStore> Drop for BindingController<A, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<A: Action, S: BindingStore> fmt::Debug for BindingController<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingController")
            .field("state", &self.state())
            .field("resolver", &self.shared.resolver)
            .finish()
    }
}
