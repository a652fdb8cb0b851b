//! Coarse "something changed" notifications with subscription tokens

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct SignalInner {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// A payload-free change notification that handlers can subscribe to
///
/// Handlers run on the thread that calls [`ChangeSignal::notify`], in
/// subscription order. The handler list is snapshotted before delivery, so a
/// handler may subscribe or unsubscribe without deadlocking.
#[derive(Clone, Default)]
pub struct ChangeSignal {
    inner: Arc<Mutex<SignalInner>>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it stays registered until the token is dropped
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, handler: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.push((id, Arc::new(handler)));
        tracing::trace!(subscription = id, "Subscribed to change signal");

        Subscription {
            id,
            signal: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver the notification to every current subscriber
    pub fn notify(&self) {
        let handlers: Vec<Handler> = self
            .inner
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::trace!(subscribers = handlers.len(), "Change signal fired");
        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }
}

impl fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Token for a registered handler
///
/// Unsubscribes exactly once, on [`Subscription::unsubscribe`] or drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    signal: Weak<Mutex<SignalInner>>,
}

impl Subscription {
    /// Remove the handler now; equivalent to dropping the token
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            inner.lock().handlers.retain(|(id, _)| *id != self.id);
            tracing::trace!(subscription = self.id, "Unsubscribed from change signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(signal: &ChangeSignal) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        let subscription = signal.subscribe(move || {
            handler_count.fetch_add(1, Ordering::SeqCst);
        });
        (count, subscription)
    }

    #[test]
    fn test_notify_reaches_subscribers() {
        let signal = ChangeSignal::new();
        let (count, _subscription) = counter(&signal);

        signal.notify();
        signal.notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_removes_handler() {
        let signal = ChangeSignal::new();
        let (count, subscription) = counter(&signal);
        assert_eq!(signal.subscriber_count(), 1);

        subscription.unsubscribe();
        assert_eq!(signal.subscriber_count(), 0);

        signal.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let signal = ChangeSignal::new();
        let (count, subscription) = counter(&signal);

        drop(subscription);
        assert_eq!(signal.subscriber_count(), 0);

        signal.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_only_removes_own_handler() {
        let signal = ChangeSignal::new();
        let (first, first_sub) = counter(&signal);
        let (second, _second_sub) = counter(&signal);

        drop(first_sub);
        signal.notify();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_outliving_signal() {
        let signal = ChangeSignal::new();
        let (_count, subscription) = counter(&signal);
        drop(signal);
        drop(subscription);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_notify() {
        let signal = ChangeSignal::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let handler_slot = Arc::clone(&slot);
        let subscription = signal.subscribe(move || {
            handler_slot.lock().take();
        });
        *slot.lock() = Some(subscription);

        signal.notify();
        assert_eq!(signal.subscriber_count(), 0);
    }
}
