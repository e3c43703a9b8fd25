//! Sessions and the components that log them.
//!
//! Components talk over a [`Relay`](trellis_core::Relay) with
//! [`SessionMessage`] envelopes:
//!
//! - [`SessionGate`] geolocates and classifies a visitor, then publishes a
//!   `SessionLogRequest`.
//! - [`LogDataManager`] owns the [`LogStore`](crate::store::LogStore) and
//!   answers log requests.
//! - [`SessionLogView`] shows the log in a grid.
//! - [`Counter`] and [`CounterBadge`] demonstrate per-session routing.

mod counter;
pub mod events;
#[cfg(feature = "networking")]
mod gate;
mod log_manager;
mod log_view;
mod record;
mod service;

pub use counter::{COUNTER_SENDER, Counter, CounterBadge};
pub use events::{CounterEvent, LogEvent, SessionMessage, SessionPayload};
#[cfg(feature = "networking")]
pub use gate::{GATE_SENDER, GateOutcome, SessionGate};
pub use log_manager::LogDataManager;
pub use log_view::{LOG_VIEW_SENDER, SessionLogView, log_grid_params};
pub use record::SessionRecord;
pub use service::SessionService;
