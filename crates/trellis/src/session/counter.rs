//! A per-session click counter and the badge that mirrors it.
//!
//! The counter and the badge live in unrelated parts of a page and only meet
//! on the relay: the counter publishes `CounterIncrement` with its session id
//! as correlation key, and the badge shows counts for its own session only.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::{Envelope, Relay, RelayError, Signal};

use super::events::{CounterEvent, SessionMessage, SessionPayload};
use super::service::SessionService;

/// Sender tag on counter envelopes.
pub const COUNTER_SENDER: &str = "Counter";

/// Counts clicks and publishes each new count.
#[derive(Debug)]
pub struct Counter {
    relay: Relay,
    session: Arc<SessionService>,
    count: AtomicU64,
}

impl Counter {
    pub fn new(relay: Relay, session: Arc<SessionService>) -> Self {
        Self {
            relay,
            session,
            count: AtomicU64::new(0),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Increment and publish the new count.
    pub fn increment(&self) -> Result<u64, RelayError> {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;

        let mut msg: SessionMessage = Envelope::new(COUNTER_SENDER, CounterEvent::CounterIncrement.token())
            .with_payload(SessionPayload::Count(count));
        if let Some(session_id) = self.session.current_id() {
            msg = msg.with_correlation_key(session_id);
        }
        self.relay.publish(&msg)?;
        Ok(count)
    }
}

/// Shows the latest count published for its session.
#[derive(Debug)]
pub struct CounterBadge {
    session: Arc<SessionService>,
    count: AtomicU64,
    count_changed: Signal<u64>,
}

impl CounterBadge {
    /// Create a badge and subscribe it to `relay`.
    pub fn attach(relay: &Relay, session: Arc<SessionService>) -> Arc<Self> {
        let badge = Arc::new(Self {
            session,
            count: AtomicU64::new(0),
            count_changed: Signal::new(),
        });
        relay.subscribe(&badge, |badge: &Self, msg: &SessionMessage| {
            badge.on_message(msg);
            Ok(())
        });
        badge
    }

    /// Stop listening. The badge keeps its last count.
    pub fn detach(self: &Arc<Self>, relay: &Relay) {
        relay.unsubscribe_all(self);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Text shown in the badge.
    pub fn text(&self) -> String {
        self.count().to_string()
    }

    /// Emitted with each new count.
    pub fn count_changed(&self) -> &Signal<u64> {
        &self.count_changed
    }

    fn on_message(&self, msg: &SessionMessage) {
        let session_id = self.session.current_id();
        if !msg.matches(
            COUNTER_SENDER,
            session_id.as_deref(),
            CounterEvent::CounterIncrement.token(),
        ) {
            return;
        }
        if let Some(SessionPayload::Count(count)) = msg.payload() {
            self.count.store(*count, Ordering::SeqCst);
            self.count_changed.emit(*count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;

    fn session() -> Arc<SessionService> {
        Arc::new(SessionService::with_session(SessionRecord::new()))
    }

    #[test]
    fn test_badge_follows_its_own_counter() {
        let relay = Relay::new();
        let mine = session();
        let counter = Counter::new(relay.clone(), mine.clone());
        let badge = CounterBadge::attach(&relay, mine);

        assert_eq!(badge.text(), "0");
        counter.increment().unwrap();
        counter.increment().unwrap();
        assert_eq!(counter.count(), 2);
        assert_eq!(badge.count(), 2);
    }

    #[test]
    fn test_badge_ignores_other_sessions() {
        let relay = Relay::new();
        let other = Counter::new(relay.clone(), session());
        let badge = CounterBadge::attach(&relay, session());

        other.increment().unwrap();
        assert_eq!(badge.count(), 0);
    }

    #[test]
    fn test_detached_badge_stops_updating() {
        let relay = Relay::new();
        let mine = session();
        let counter = Counter::new(relay.clone(), mine.clone());
        let badge = CounterBadge::attach(&relay, mine);

        counter.increment().unwrap();
        badge.detach(&relay);
        counter.increment().unwrap();
        assert_eq!(badge.count(), 1);
        assert_eq!(relay.subscriber_count::<SessionMessage>(), 0);
    }

    #[test]
    fn test_count_changed_signal() {
        let relay = Relay::new();
        let mine = session();
        let counter = Counter::new(relay.clone(), mine.clone());
        let badge = CounterBadge::attach(&relay, mine);

        let seen = Arc::new(AtomicU64::new(0));
        let sink = seen.clone();
        badge.count_changed().connect(move |n| sink.store(*n, Ordering::SeqCst));

        counter.increment().unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
