//! Per-visitor session state.

use parking_lot::RwLock;
use trellis_core::Signal;

use super::SessionRecord;

/// Holds the current visitor's session and announces changes to it.
///
/// One service exists per visitor. Components that need the session id
/// (for correlation keys) or the full record share it through an `Arc`.
#[derive(Debug, Default)]
pub struct SessionService {
    current: RwLock<Option<SessionRecord>>,
    session_changed: Signal<SessionRecord>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service already holding `record`.
    pub fn with_session(record: SessionRecord) -> Self {
        Self {
            current: RwLock::new(Some(record)),
            session_changed: Signal::new(),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<SessionRecord> {
        self.current.read().clone()
    }

    pub fn current_id(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.session_id.clone())
    }

    /// Replace the current session and emit `session_changed`.
    pub fn set_current(&self, record: SessionRecord) {
        *self.current.write() = Some(record.clone());
        self.session_changed.emit(record);
    }

    /// The current session, creating one for `ip_address` if there is none.
    pub fn ensure_session(&self, ip_address: &str, user_agent: &str) -> SessionRecord {
        let created = {
            let mut current = self.current.write();
            if let Some(record) = current.as_ref() {
                return record.clone();
            }
            let record = SessionRecord::for_connection(ip_address, user_agent);
            *current = Some(record.clone());
            record
        };
        tracing::debug!(target: "trellis::session", session_id = %created.session_id, "session created");
        self.session_changed.emit(created.clone());
        created
    }

    /// Edit the current session in place and emit `session_changed`.
    ///
    /// Returns `false` without emitting when there is no session.
    pub fn update(&self, edit: impl FnOnce(&mut SessionRecord)) -> bool {
        let updated = {
            let mut current = self.current.write();
            let Some(record) = current.as_mut() else {
                return false;
            };
            edit(record);
            record.clone()
        };
        self.session_changed.emit(updated);
        true
    }

    /// Emitted with the new record whenever the session changes.
    pub fn session_changed(&self) -> &Signal<SessionRecord> {
        &self.session_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ensure_session_creates_once() {
        let service = SessionService::new();
        assert!(service.current().is_none());

        let first = service.ensure_session("23.81.0.59", "agent");
        let second = service.ensure_session("1.2.3.4", "other");
        assert_eq!(first.session_id, second.session_id);
        assert_eq!(second.ip_address, "23.81.0.59");
        assert_eq!(service.current_id(), Some(first.session_id));
    }

    #[test]
    fn test_changes_are_announced() {
        let service = SessionService::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        service.session_changed().connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!service.update(|s| s.city = "nowhere".into()));
        service.ensure_session("23.81.0.59", "agent");
        assert!(service.update(|s| s.city = "Ashburn".into()));
        service.set_current(SessionRecord::new());

        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
