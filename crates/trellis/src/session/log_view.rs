//! The session log page.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::{Envelope, Relay, RelayError};

use super::SessionRecord;
use super::events::{LogEvent, SessionMessage, SessionPayload};
use super::service::SessionService;
use crate::model::{GridModel, GridParams, format_number};

/// Sender tag on the view's requests.
pub const LOG_VIEW_SENDER: &str = "SessionLogView";

/// Grid configuration of the session log.
pub fn log_grid_params() -> GridParams {
    GridParams {
        title: entries_title(0),
        column_class: "col-lg".to_string(),
        container_class: "container-fluid".to_string(),
        primary_key: Some("session_id".to_string()),
        ..GridParams::default()
    }
    .with_pager(10)
}

fn entries_title(count: usize) -> String {
    let count = format_number(count as f64, "N0").unwrap_or_else(|_| count.to_string());
    format!("{count} entries")
}

/// Shows the session log in a grid.
///
/// Opening the view requests the log over the relay; the grid fills when the
/// matching response (same sender, this session's id) arrives.
pub struct SessionLogView {
    relay: Relay,
    session: Arc<SessionService>,
    grid: Mutex<GridModel<SessionRecord>>,
}

impl std::fmt::Debug for SessionLogView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLogView")
            .field("grid", &*self.grid.lock())
            .finish_non_exhaustive()
    }
}

impl SessionLogView {
    /// Subscribe a new view and request the log.
    pub fn open(relay: &Relay, session: Arc<SessionService>) -> Result<Arc<Self>, RelayError> {
        let view = Arc::new(Self {
            relay: relay.clone(),
            session,
            grid: Mutex::new(GridModel::new(log_grid_params())),
        });
        relay.subscribe(&view, |view: &Self, msg: &SessionMessage| {
            view.on_message(msg);
            Ok(())
        });
        view.refresh()?;
        Ok(view)
    }

    /// Request the log again.
    pub fn refresh(&self) -> Result<(), RelayError> {
        self.relay.publish(&self.request(LogEvent::GetLogDataRequest))?;
        Ok(())
    }

    /// Erase the log and reset the view to an empty grid.
    pub fn erase_log(&self) -> Result<(), RelayError> {
        self.relay.publish(&self.request(LogEvent::EraseLogRequest))?;
        *self.grid.lock() = GridModel::new(log_grid_params());
        tracing::info!(target: "trellis::session", "session log erased from view");
        Ok(())
    }

    /// Stop receiving responses.
    pub fn close(self: &Arc<Self>) {
        self.relay.unsubscribe_all(self);
    }

    /// Run `f` against the grid, e.g. to apply a sort click or page gesture.
    pub fn with_grid<R>(&self, f: impl FnOnce(&mut GridModel<SessionRecord>) -> R) -> R {
        f(&mut self.grid.lock())
    }

    pub fn title(&self) -> String {
        self.grid.lock().params().title.clone()
    }

    /// Number of logged sessions loaded into the grid.
    pub fn row_count(&self) -> usize {
        self.grid.lock().rows().len()
    }

    fn request(&self, event: LogEvent) -> SessionMessage {
        let msg = Envelope::new(LOG_VIEW_SENDER, event.token());
        match self.session.current_id() {
            Some(id) => msg.with_correlation_key(id),
            None => msg,
        }
    }

    fn on_message(&self, msg: &SessionMessage) {
        let session_id = self.session.current_id();
        if !msg.matches(
            LOG_VIEW_SENDER,
            session_id.as_deref(),
            LogEvent::GetLogDataResponse.token(),
        ) {
            return;
        }
        let Some(SessionPayload::Sessions(records)) = msg.payload() else {
            return;
        };

        let mut grid = self.grid.lock();
        grid.set_rows(records.clone());
        grid.set_title(entries_title(records.len()));
        tracing::debug!(target: "trellis::session", rows = records.len(), "session log loaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LogDataManager;
    use crate::store::{LogStore, SqliteLogStore};

    fn populated(count: usize) -> (Relay, Arc<LogDataManager<SqliteLogStore>>) {
        let relay = Relay::new();
        let store = SqliteLogStore::open_in_memory().unwrap();
        for _ in 0..count {
            store.append(&SessionRecord::new()).unwrap();
        }
        let manager = LogDataManager::attach(store, &relay);
        (relay, manager)
    }

    fn viewer() -> Arc<SessionService> {
        Arc::new(SessionService::with_session(SessionRecord::new()))
    }

    #[test]
    fn test_params() {
        let params = log_grid_params();
        assert_eq!(params.title, "0 entries");
        assert!(params.show_pager);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.column_class, "col-lg");
        assert_eq!(params.primary_key.as_deref(), Some("session_id"));
    }

    #[test]
    fn test_open_loads_log() {
        let (relay, _manager) = populated(12);
        let view = SessionLogView::open(&relay, viewer()).unwrap();

        assert_eq!(view.row_count(), 12);
        assert_eq!(view.title(), "12 entries");
        view.with_grid(|grid| {
            assert_eq!(grid.total_pages(), 2);
            assert_eq!(grid.visible_page().len(), 10);
        });
    }

    #[test]
    fn test_title_groups_thousands() {
        assert_eq!(entries_title(1234), "1,234 entries");
    }

    #[test]
    fn test_responses_for_other_sessions_are_ignored() {
        let (relay, _manager) = populated(3);
        let view = SessionLogView::open(&relay, viewer()).unwrap();
        let other = SessionLogView::open(&relay, viewer()).unwrap();
        assert_eq!(view.row_count(), 3);
        assert_eq!(other.row_count(), 3);

        relay
            .publish(
                &Envelope::new(LOG_VIEW_SENDER, LogEvent::GetLogDataResponse.token())
                    .with_correlation_key("someone-else")
                    .with_payload(SessionPayload::Sessions(vec![SessionRecord::new()])),
            )
            .unwrap();
        assert_eq!(view.row_count(), 3);
    }

    #[test]
    fn test_erase_log_empties_store_and_view() {
        let (relay, manager) = populated(4);
        let view = SessionLogView::open(&relay, viewer()).unwrap();
        view.erase_log().unwrap();

        assert_eq!(view.row_count(), 0);
        assert_eq!(view.title(), "0 entries");
        assert!(manager.store().fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_closed_view_stops_listening() {
        let (relay, manager) = populated(1);
        let view = SessionLogView::open(&relay, viewer()).unwrap();
        view.close();

        manager.store().append(&SessionRecord::new()).unwrap();
        view.refresh().unwrap();
        assert_eq!(view.row_count(), 1);
    }
}
