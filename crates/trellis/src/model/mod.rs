//! The data grid engine.
//!
//! A [`GridModel`] owns the rows of one rendered grid and derives what the
//! view shows from them: the current sort order, the filtered subset, the
//! visible page and the summary line. Column discovery and display metadata
//! come from the row type's [`GridRow`](trellis_core::GridRow) field table.
//!
//! # Pieces
//!
//! - [`GridParams`]: caller-owned configuration (title, pager, classes, summary)
//! - [`sort_rows`]: stable sort of rows by a named field
//! - [`PageRequest`]: pager gestures and page arithmetic
//! - [`format_value`] / [`format_number`]: .NET-style display formats
//!
//! # Example
//!
//! ```ignore
//! use trellis::model::{GridModel, GridParams, PageRequest, SummaryKind};
//!
//! let params = GridParams::new()
//!     .with_pager(10)
//!     .with_summary("total", SummaryKind::Sum, "Total", "C2");
//! let mut grid = GridModel::<Invoice>::new(params);
//!
//! grid.changed().connect(|change| println!("grid changed: {change:?}"));
//! grid.set_rows(invoices);
//! grid.set_filter_text("customer", "acme")?;
//! grid.on_filter_input();
//! grid.get_page(PageRequest::Last);
//! println!("{}", grid.summary_text().unwrap_or_default());
//! ```

mod format;
mod grid;
mod paging;
mod params;
mod sorter;

#[cfg(test)]
pub(crate) mod test_rows;

pub use format::{format_datetime, format_number, format_value};
pub use grid::{GridChange, GridModel};
pub use paging::{PageRequest, page_count, page_range};
pub use params::{GridParams, SummaryKind};
pub use sorter::{SortDirection, sort_rows, sorted};
