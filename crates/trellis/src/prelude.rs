//! Commonly used types.
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use crate::{Envelope, FieldMeta, FieldValue, GridRow, Relay, Signal};

// ============================================================================
// Grid
// ============================================================================

pub use crate::model::{GridChange, GridModel, GridParams, PageRequest, SortDirection, SummaryKind};

// ============================================================================
// Sessions
// ============================================================================

pub use crate::session::{
    Counter, CounterBadge, LogDataManager, SessionLogView, SessionMessage, SessionPayload,
    SessionRecord, SessionService,
};
#[cfg(feature = "networking")]
pub use crate::session::{GateOutcome, SessionGate};
pub use crate::settings::AppSettings;
pub use crate::store::{LogStore, SqliteLogStore};

pub use crate::error::{Error, Result};
