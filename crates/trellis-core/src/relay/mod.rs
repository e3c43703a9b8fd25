//! Type-keyed publish/subscribe relay.
//!
//! A [`Relay`] fans a published message out to every handler registered for
//! the message's concrete type. It does no routing beyond that: components
//! that share a message type (usually [`Envelope`]) filter on its token,
//! sender and correlation key themselves.
//!
//! # Ownership
//!
//! Every subscription names an owner (`Arc<O>`). The relay keeps only a weak
//! reference to it, so a component that is dropped without unsubscribing
//! simply stops receiving messages: dispatch to a dead owner is a no-op and
//! the stale entry is pruned. Components that tear down while something else
//! still holds them call [`Relay::unsubscribe_all`], or keep the
//! [`Subscription`] guard returned by [`Relay::subscribe_scoped`].
//!
//! # Dispatch
//!
//! [`Relay::publish`] runs handlers synchronously on the calling thread, in
//! registration order. Handlers run outside the relay's lock and may publish
//! or subscribe re-entrantly. A handler error stops dispatch and is returned
//! to the publisher unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use trellis_core::relay::{Envelope, Relay};
//!
//! struct Badge {
//!     count: AtomicU32,
//! }
//!
//! let relay = Relay::new();
//! let badge = Arc::new(Badge { count: AtomicU32::new(0) });
//!
//! relay.subscribe(&badge, |badge: &Badge, msg: &Envelope<u32>| {
//!     if msg.is_token("CounterIncrement") {
//!         badge.count.store(msg.payload().copied().unwrap_or(0), Ordering::SeqCst);
//!     }
//!     Ok(())
//! });
//!
//! relay.publish(&Envelope::new("Counter", "CounterIncrement").with_payload(3u32))?;
//! assert_eq!(badge.count.load(Ordering::SeqCst), 3);
//!
//! relay.unsubscribe_all(&badge);
//! # Ok::<(), trellis_core::RelayError>(())
//! ```

mod envelope;

pub use envelope::Envelope;

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{HandlerError, RelayError};

new_key_type! {
    /// Identifies one relay subscription.
    pub struct SubscriptionId;
}

/// Result returned by relay handlers.
pub type HandlerResult = std::result::Result<(), HandlerError>;

enum Delivery {
    Handled(HandlerResult),
    OwnerGone,
}

type Deliver = Arc<dyn Fn(&dyn Any) -> Delivery + Send + Sync>;

struct Subscriber {
    message_type: TypeId,
    owner: usize,
    seq: u64,
    deliver: Deliver,
}

struct RelayInner {
    subscribers: Mutex<SlotMap<SubscriptionId, Subscriber>>,
    next_seq: AtomicU64,
}

fn owner_key<O>(owner: &Arc<O>) -> usize {
    Arc::as_ptr(owner).cast::<()>() as usize
}

/// In-process publish/subscribe bus keyed by message type.
///
/// `Relay` is a cheap handle; clones share the same subscriber table.
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("subscribers", &self.inner.subscribers.lock().len())
            .finish()
    }
}

impl Relay {
    /// Create an empty relay.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                subscribers: Mutex::new(SlotMap::with_key()),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Register `handler` for messages of type `M` on behalf of `owner`.
    ///
    /// The relay holds `owner` weakly. Once the last strong reference is
    /// gone the handler is never invoked again.
    pub fn subscribe<O, M, F>(&self, owner: &Arc<O>, handler: F) -> SubscriptionId
    where
        O: Send + Sync + 'static,
        M: 'static,
        F: Fn(&O, &M) -> HandlerResult + Send + Sync + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(owner);
        let deliver: Deliver = Arc::new(move |message: &dyn Any| {
            let Some(owner) = weak.upgrade() else {
                return Delivery::OwnerGone;
            };
            match message.downcast_ref::<M>() {
                Some(message) => Delivery::Handled(handler(&owner, message)),
                None => Delivery::Handled(Ok(())),
            }
        });

        let subscriber = Subscriber {
            message_type: TypeId::of::<M>(),
            owner: owner_key(owner),
            seq: self.inner.next_seq.fetch_add(1, Ordering::Relaxed),
            deliver,
        };
        let id = self.inner.subscribers.lock().insert(subscriber);
        tracing::trace!(
            target: "trellis_core::relay",
            message_type = std::any::type_name::<M>(),
            ?id,
            "subscribed"
        );
        id
    }

    /// Like [`subscribe`](Self::subscribe), returning a guard that
    /// unsubscribes when dropped.
    pub fn subscribe_scoped<O, M, F>(&self, owner: &Arc<O>, handler: F) -> Subscription
    where
        O: Send + Sync + 'static,
        M: 'static,
        F: Fn(&O, &M) -> HandlerResult + Send + Sync + 'static,
    {
        Subscription {
            relay: self.downgrade(),
            id: self.subscribe(owner, handler),
        }
    }

    /// Remove one subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.lock().remove(id).is_some()
    }

    /// Remove every subscription registered on behalf of `owner`.
    ///
    /// Takes effect immediately, including for a publish that is currently
    /// dispatching. Returns the number of subscriptions removed.
    pub fn unsubscribe_all<O>(&self, owner: &Arc<O>) -> usize {
        let key = owner_key(owner);
        let mut subscribers = self.inner.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|_, s| s.owner != key);
        let removed = before - subscribers.len();
        tracing::trace!(target: "trellis_core::relay", removed, "unsubscribed owner");
        removed
    }

    /// Number of live subscriptions for messages of type `M`.
    pub fn subscriber_count<M: 'static>(&self) -> usize {
        let type_id = TypeId::of::<M>();
        self.inner
            .subscribers
            .lock()
            .values()
            .filter(|s| s.message_type == type_id)
            .count()
    }

    /// Remove all subscriptions.
    pub fn clear(&self) {
        self.inner.subscribers.lock().clear();
    }

    /// Create a non-owning handle, for handlers that publish responses.
    pub fn downgrade(&self) -> WeakRelay {
        WeakRelay {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Publish `message` to every handler registered for its type.
    ///
    /// Returns the number of handlers that ran to completion. The first
    /// handler error aborts dispatch and is returned as
    /// [`RelayError::Handler`].
    #[tracing::instrument(
        skip_all,
        target = "trellis_core::relay",
        level = "trace",
        fields(message_type = std::any::type_name::<M>())
    )]
    pub fn publish<M: 'static>(&self, message: &M) -> Result<usize, RelayError> {
        let type_id = TypeId::of::<M>();
        let mut targets: Vec<(u64, SubscriptionId, Deliver)> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .filter(|(_, s)| s.message_type == type_id)
            .map(|(id, s)| (s.seq, id, s.deliver.clone()))
            .collect();
        targets.sort_by_key(|(seq, _, _)| *seq);

        let mut delivered = 0;
        let mut dead = Vec::new();
        let mut outcome = Ok(());

        for (_, id, deliver) in targets {
            // A handler earlier in this dispatch may have unsubscribed it.
            if !self.inner.subscribers.lock().contains_key(id) {
                continue;
            }
            match deliver(message) {
                Delivery::OwnerGone => dead.push(id),
                Delivery::Handled(Ok(())) => delivered += 1,
                Delivery::Handled(Err(source)) => {
                    outcome = Err(RelayError::Handler {
                        message_type: std::any::type_name::<M>(),
                        source,
                    });
                    break;
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.inner.subscribers.lock();
            for id in &dead {
                subscribers.remove(*id);
            }
            tracing::debug!(target: "trellis_core::relay", pruned = dead.len(), "pruned dead subscribers");
        }

        tracing::trace!(target: "trellis_core::relay", delivered, "published");
        outcome.map(|()| delivered)
    }
}

/// Non-owning relay handle.
#[derive(Clone, Default)]
pub struct WeakRelay {
    inner: Weak<RelayInner>,
}

impl WeakRelay {
    /// Get the relay back, if it is still alive.
    pub fn upgrade(&self) -> Option<Relay> {
        self.inner.upgrade().map(|inner| Relay { inner })
    }
}

impl std::fmt::Debug for WeakRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakRelay")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// RAII guard for a relay subscription.
///
/// Dropping the guard unsubscribes. If the relay is already gone, dropping
/// does nothing.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    relay: WeakRelay,
    id: SubscriptionId,
}

impl Subscription {
    /// The underlying subscription ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.upgrade() {
            relay.unsubscribe(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Relay: Send, Sync, Clone);
static_assertions::assert_impl_all!(WeakRelay: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    struct Ping(&'static str);
    struct Pong;

    fn record(recorder: &Recorder, ping: &Ping) -> HandlerResult {
        recorder.seen.lock().push(ping.0.to_string());
        Ok(())
    }

    #[test]
    fn test_publish_reaches_live_owner() {
        let relay = Relay::new();
        let owner = Arc::new(Recorder::default());
        relay.subscribe(&owner, record);

        assert_eq!(relay.publish(&Ping("hello")).unwrap(), 1);
        assert_eq!(*owner.seen.lock(), vec!["hello"]);
    }

    #[test]
    fn test_fan_out_is_type_keyed() {
        let relay = Relay::new();
        let owner = Arc::new(Recorder::default());
        relay.subscribe(&owner, record);

        assert_eq!(relay.publish(&Pong).unwrap(), 0);
        assert_eq!(relay.subscriber_count::<Ping>(), 1);
        assert_eq!(relay.subscriber_count::<Pong>(), 0);
        assert!(owner.seen.lock().is_empty());
    }

    #[test]
    fn test_registration_order() {
        let relay = Relay::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let owners: Vec<_> = (0..5).map(|_| Arc::new(Recorder::default())).collect();

        for (i, owner) in owners.iter().enumerate() {
            let log = log.clone();
            relay.subscribe(owner, move |_: &Recorder, _: &Ping| {
                log.lock().push(i);
                Ok(())
            });
        }
        // Free a slot so a later insert could reuse it.
        relay.unsubscribe_all(&owners[1]);
        let late = Arc::new(Recorder::default());
        let log_clone = log.clone();
        relay.subscribe(&late, move |_: &Recorder, _: &Ping| {
            log_clone.lock().push(99);
            Ok(())
        });

        relay.publish(&Ping("x")).unwrap();
        assert_eq!(*log.lock(), vec![0, 2, 3, 4, 99]);
    }

    #[test]
    fn test_unsubscribe_all_is_immediate() {
        let relay = Relay::new();
        let owner = Arc::new(Recorder::default());
        relay.subscribe(&owner, record);
        relay.subscribe(&owner, record);

        assert_eq!(relay.unsubscribe_all(&owner), 2);
        assert_eq!(relay.publish(&Ping("ignored")).unwrap(), 0);
        assert!(owner.seen.lock().is_empty());
    }

    #[test]
    fn test_dead_owner_is_noop_and_pruned() {
        let relay = Relay::new();
        let owner = Arc::new(Recorder::default());
        relay.subscribe(&owner, record);
        drop(owner);

        assert_eq!(relay.publish(&Ping("late")).unwrap(), 0);
        assert_eq!(relay.subscriber_count::<Ping>(), 0);
    }

    #[test]
    fn test_handler_error_propagates_and_stops_dispatch() {
        let relay = Relay::new();
        let failing = Arc::new(Recorder::default());
        let after = Arc::new(Recorder::default());

        relay.subscribe(&failing, |_: &Recorder, _: &Ping| Err("store offline".into()));
        relay.subscribe(&after, record);

        let err = relay.publish(&Ping("boom")).unwrap_err();
        assert!(err.to_string().contains("store offline"));
        assert!(after.seen.lock().is_empty());
    }

    #[test]
    fn test_reentrant_publish() {
        let relay = Relay::new();
        let responder = Arc::new(Recorder::default());
        let listener = Arc::new(Recorder::default());

        let weak = relay.downgrade();
        relay.subscribe(&responder, move |_: &Recorder, ping: &Ping| {
            if ping.0 == "request" {
                if let Some(relay) = weak.upgrade() {
                    relay.publish(&Ping("response"))?;
                }
            }
            Ok(())
        });
        relay.subscribe(&listener, record);

        relay.publish(&Ping("request")).unwrap();
        assert_eq!(*listener.seen.lock(), vec!["response", "request"]);
    }

    #[test]
    fn test_handler_unsubscribing_later_handler() {
        let relay = Relay::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let second_clone = second.clone();
        let relay_clone = relay.clone();
        relay.subscribe(&first, move |_: &Recorder, _: &Ping| {
            relay_clone.unsubscribe_all(&second_clone);
            Ok(())
        });
        relay.subscribe(&second, record);

        assert_eq!(relay.publish(&Ping("x")).unwrap(), 1);
        assert!(second.seen.lock().is_empty());
        relay.clear();
    }

    #[test]
    fn test_scoped_subscription() {
        let relay = Relay::new();
        let owner = Arc::new(Recorder::default());
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = hits.clone();
        let guard = relay.subscribe_scoped(&owner, move |_: &Recorder, _: &Ping| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        relay.publish(&Ping("one")).unwrap();
        drop(guard);
        relay.publish(&Ping("two")).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_outliving_relay() {
        let relay = Relay::new();
        let owner = Arc::new(Recorder::default());
        let guard = relay.subscribe_scoped(&owner, record);
        drop(relay);
        drop(guard);
    }
}
