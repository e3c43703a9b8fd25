//! Relay front end of the session log store.

use std::sync::Arc;

use trellis_core::{HandlerResult, Relay, WeakRelay};

use super::events::{LogEvent, SessionMessage, SessionPayload};
use crate::store::LogStore;

/// Serves session log requests arriving over the relay.
///
/// Construct one at startup with [`LogDataManager::attach`] and keep the
/// returned `Arc` alive for as long as requests should be served; the relay
/// holds it only weakly.
///
/// | token | action |
/// |---|---|
/// | `EraseLogRequest` | erase the log |
/// | `GetLogDataRequest` | fetch the log and publish `GetLogDataResponse` with the request's sender and correlation key |
/// | `SessionLogRequest` | append the carried session |
///
/// Store errors are returned from the handler, so they surface from the
/// requester's `publish` call.
pub struct LogDataManager<S> {
    store: S,
    relay: WeakRelay,
}

impl<S> std::fmt::Debug for LogDataManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogDataManager").finish_non_exhaustive()
    }
}

impl<S: LogStore + 'static> LogDataManager<S> {
    /// Create a manager over `store` and subscribe it to `relay`.
    pub fn attach(store: S, relay: &Relay) -> Arc<Self> {
        let manager = Arc::new(Self {
            store,
            relay: relay.downgrade(),
        });
        relay.subscribe(&manager, |manager: &Self, msg: &SessionMessage| manager.handle(msg));
        tracing::debug!(target: "trellis::session", "log data manager attached");
        manager
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn handle(&self, msg: &SessionMessage) -> HandlerResult {
        let Some(event) = LogEvent::from_token(msg.token()) else {
            return Ok(());
        };

        match event {
            LogEvent::EraseLogRequest => {
                self.store.erase_all()?;
            }
            LogEvent::GetLogDataRequest => {
                let records = self.store.fetch_all()?;
                let Some(relay) = self.relay.upgrade() else {
                    tracing::warn!(target: "trellis::session", "relay dropped, log data response not sent");
                    return Ok(());
                };
                let response =
                    msg.respond(LogEvent::GetLogDataResponse.token(), SessionPayload::Sessions(records));
                relay.publish(&response)?;
            }
            LogEvent::SessionLogRequest => match msg.payload() {
                Some(SessionPayload::Session(record)) => {
                    self.store.append(record)?;
                }
                _ => {
                    tracing::debug!(
                        target: "trellis::session",
                        sender = msg.sender(),
                        "session log request without a session, ignored"
                    );
                }
            },
            LogEvent::GetLogDataResponse => {}
        }
        Ok(())
    }
}
