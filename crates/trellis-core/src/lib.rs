//! Core systems for Trellis.
//!
//! This crate provides the foundational pieces the grid engine and the
//! session components build on:
//!
//! - **Field metadata**: per-field display configuration and a process-wide
//!   cache of per-type field tables
//! - **Event relay**: type-keyed publish/subscribe with weakly held owners
//! - **Signals**: per-object change notification
//! - **Logging**: tracing targets and helpers
//!
//! # Relay Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis_core::{Envelope, Relay};
//!
//! struct Listener;
//!
//! let relay = Relay::new();
//! let listener = Arc::new(Listener);
//! relay.subscribe(&listener, |_: &Listener, msg: &Envelope<String>| {
//!     println!("{} says {:?}", msg.sender(), msg.payload());
//!     Ok(())
//! });
//!
//! relay.publish(&Envelope::new("Demo", "Hello").with_payload("hi".to_string()))?;
//! # Ok::<(), trellis_core::RelayError>(())
//! ```

mod error;
pub mod logging;
pub mod meta;
pub mod relay;
pub mod signal;

pub use error::{CoreError, HandlerError, MetaError, RelayError, Result};
pub use logging::PerfSpan;
pub use meta::{
    Align, FieldDescriptor, FieldMeta, FieldRegistry, FieldTable, FieldValue, GridRow,
    ToFieldValue,
};
pub use relay::{Envelope, HandlerResult, Relay, Subscription, SubscriptionId, WeakRelay};
pub use signal::{ConnectionId, Signal};
