//! Trellis - a metadata-driven data grid with session logging.
//!
//! This is the umbrella crate. It re-exports the core systems and the
//! `GridRow` derive, and adds:
//!
//! - [`model`]: the grid engine (sorting, filtering, paging, summary) and
//!   value formatting
//! - [`store`]: the session log store
//! - [`session`]: sessions and the relay components that gate, log and show
//!   them
//! - [`settings`]: application settings
//!
//! # Example
//!
//! ```
//! use trellis::model::{GridModel, GridParams, PageRequest};
//! use trellis::GridRow;
//!
//! #[derive(Debug, Clone, GridRow)]
//! struct Reading {
//!     #[grid(filterable)]
//!     site: String,
//!     #[grid(format = "N1")]
//!     value: f64,
//! }
//!
//! let mut grid = GridModel::new(GridParams::new().with_pager(2));
//! grid.set_rows(vec![
//!     Reading { site: "north".into(), value: 1.25 },
//!     Reading { site: "south".into(), value: 3.5 },
//!     Reading { site: "north".into(), value: 2.0 },
//! ]);
//! grid.on_sort_click("value")?;
//! grid.get_page(PageRequest::Last);
//! assert_eq!(grid.visible_page().len(), 1);
//! # Ok::<(), trellis::Error>(())
//! ```

pub use trellis_core::*;
pub use trellis_macros::*;

pub mod error;
pub mod model;
pub mod prelude;
pub mod session;
pub mod settings;
pub mod store;

pub use error::{Error, FormatError, GridError, Result, SettingsError, StoreError};

/// Networking module.
#[cfg(feature = "networking")]
pub mod net {
    pub use trellis_net::*;
}
