//! The grid state engine.

use std::collections::HashMap;

use trellis_core::{FieldMeta, FieldRegistry, FieldTable, GridRow, PerfSpan, Signal};

use super::format::{format_number, format_value};
use super::paging::{PageRequest, page_count, page_range};
use super::params::GridParams;
use super::sorter::{SortDirection, sort_rows};
use crate::error::GridError;

/// What a grid mutation changed. Emitted through [`GridModel::changed`].
#[derive(Debug, Clone, PartialEq)]
pub enum GridChange {
    /// Rows were assigned.
    Loaded { rows: usize },
    /// The visible page moved.
    Page { page: usize },
    /// Filters were applied.
    Filtered { matches: usize },
    /// Filters were cleared.
    FilterCleared,
    /// A column was sorted.
    Sorted {
        field: String,
        direction: SortDirection,
    },
}

/// State captured on the first non-empty row assignment.
struct Columns {
    table: FieldTable,
    /// Per-field direction of the last sort, `true` (ascending) until the
    /// field is first clicked.
    sort_ascending: HashMap<&'static str, bool>,
}

/// Sort, filter, paging and summary state of one rendered grid.
///
/// A model starts uninitialized and becomes ready on the first
/// [`set_rows`](Self::set_rows) with a non-empty list. Every gesture after
/// that (sort click, filter input, page navigation, new rows) re-derives the
/// visible page, which is always a contiguous slice of the working set: the
/// filtered rows while a filter is active, the original rows otherwise.
///
/// One model serves one session. It is `Send` when `T` is, but expects
/// callers to serialize access.
///
/// # Example
///
/// ```ignore
/// use trellis::model::{GridModel, GridParams, PageRequest};
///
/// let mut grid = GridModel::<Reading>::new(GridParams::new().with_pager(2));
/// grid.set_rows(readings);
/// grid.on_sort_click("value")?;
/// grid.get_page(PageRequest::Next);
/// for row in grid.visible_page() {
///     println!("{}", grid.display_value(row, "value"));
/// }
/// ```
pub struct GridModel<T> {
    params: GridParams,
    columns: Option<Columns>,
    /// Filter text per field, in declaration order.
    filter_text: Vec<String>,
    original: Vec<T>,
    filtered: Vec<T>,
    visible: Vec<T>,
    current_page: usize,
    total_pages: usize,
    filter_active: bool,
    summary: Option<String>,
    changed: Signal<GridChange>,
}

impl<T> std::fmt::Debug for GridModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridModel")
            .field("initialized", &self.columns.is_some())
            .field("rows", &self.original.len())
            .field("filtered", &self.filtered.len())
            .field("current_page", &self.current_page)
            .field("total_pages", &self.total_pages)
            .field("filter_active", &self.filter_active)
            .finish_non_exhaustive()
    }
}

impl<T: GridRow + Clone> GridModel<T> {
    /// Create an uninitialized grid.
    pub fn new(params: GridParams) -> Self {
        Self {
            params,
            columns: None,
            filter_text: vec![String::new(); T::fields().len()],
            original: Vec::new(),
            filtered: Vec::new(),
            visible: Vec::new(),
            current_page: 1,
            total_pages: 1,
            filter_active: false,
            summary: None,
            changed: Signal::new(),
        }
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Assign the grid's rows.
    ///
    /// An empty list is ignored, so a host can call this on every
    /// configuration change until data arrives. The first non-empty list
    /// initializes the grid on page 1. Later lists replace the rows, reapply
    /// any filter and keep the current page (clamped to the new page count).
    #[tracing::instrument(skip_all, target = "trellis::grid", level = "debug", fields(rows = rows.len()))]
    pub fn set_rows(&mut self, rows: Vec<T>) {
        if rows.is_empty() {
            tracing::trace!(target: "trellis::grid", "empty row list, nothing to load");
            return;
        }

        let count = rows.len();
        self.original = rows;
        self.summary = None;

        if self.columns.is_none() {
            let table = FieldRegistry::field_metadata::<T>();
            let sort_ascending = table.names().map(|name| (name, true)).collect();
            self.columns = Some(Columns {
                table,
                sort_ascending,
            });
            self.filtered.clear();
            self.filter_active = false;
            if self.has_filter_text() {
                self.apply_filters();
            }
            self.compute_paging();
            self.current_page = 1;
        } else {
            if self.has_filter_text() {
                self.apply_filters();
            }
            self.compute_paging();
        }
        self.refresh_page();

        tracing::debug!(
            target: "trellis::grid",
            rows = count,
            page = self.current_page,
            total_pages = self.total_pages,
            "rows loaded"
        );
        self.changed.emit(GridChange::Loaded { rows: count });
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Recompute the page count over the working set.
    ///
    /// With the pager off there is exactly one page and `page_size` is forced
    /// to the working set's length. With it on, a zero page size is raised to
    /// one. The current page is clamped into the new range.
    pub fn compute_paging(&mut self) {
        let len = self.working_set().len();
        if self.params.show_pager {
            self.params.page_size = self.params.page_size.max(1);
            self.total_pages = page_count(len, self.params.page_size);
        } else {
            self.params.page_size = len;
            self.total_pages = 1;
        }
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }

    /// Move to another page. Does nothing while the pager is off.
    pub fn get_page(&mut self, request: PageRequest) {
        if !self.params.show_pager {
            return;
        }
        self.current_page = request.resolve(self.current_page, self.total_pages);
        self.refresh_page();

        tracing::trace!(target: "trellis::grid", %request, page = self.current_page, "page changed");
        self.changed.emit(GridChange::Page {
            page: self.current_page,
        });
    }

    /// Move to a page named by a literal: `next`, `previous`, `first`, `last`
    /// or a page number.
    pub fn get_page_literal(&mut self, literal: &str) -> Result<(), GridError> {
        let request: PageRequest = literal.parse()?;
        self.get_page(request);
        Ok(())
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Set the filter text for `field`. Takes effect on the next
    /// [`on_filter_input`](Self::on_filter_input). Text set before any rows
    /// arrive is applied when the first rows are assigned.
    pub fn set_filter_text(&mut self, field: &str, text: impl Into<String>) -> Result<(), GridError> {
        let index = Self::field_index(field)?;
        self.filter_text[index] = text.into();
        Ok(())
    }

    /// Current filter text for `field`, empty when unset or unknown.
    pub fn filter_text(&self, field: &str) -> &str {
        match Self::field_index(field) {
            Ok(index) => &self.filter_text[index],
            Err(_) => "",
        }
    }

    /// Recompute the filtered rows from the current filter text and jump to
    /// page 1.
    ///
    /// The first field with filter text (in declaration order) seeds the
    /// candidates from the original rows. Each later field with filter text
    /// removes the candidates that do not match it. A row matches when the
    /// field's trimmed text contains the filter text, ignoring case. A seed
    /// that matches nothing is not replaced by a later field's matches, so
    /// every field with text must match.
    ///
    /// The filter is active only if some filter text was set and at least
    /// one row matched. Otherwise the original rows are shown.
    #[tracing::instrument(skip_all, target = "trellis::grid", level = "debug")]
    pub fn on_filter_input(&mut self) {
        if self.columns.is_none() {
            return;
        }
        self.apply_filters();
        self.compute_paging();
        self.current_page = 1;
        self.refresh_page();

        let matches = if self.filter_active {
            self.filtered.len()
        } else {
            0
        };
        tracing::debug!(target: "trellis::grid", matches, active = self.filter_active, "filter applied");
        self.changed.emit(GridChange::Filtered { matches });
    }

    /// Clear every filter and show the original rows from page 1.
    pub fn cancel_filter(&mut self) {
        self.filter_text.iter_mut().for_each(String::clear);
        if self.columns.is_none() {
            return;
        }
        self.filter_active = false;
        self.filtered.clear();
        self.compute_paging();
        self.current_page = 1;
        self.refresh_page();

        tracing::debug!(target: "trellis::grid", "filter cleared");
        self.changed.emit(GridChange::FilterCleared);
    }

    fn has_filter_text(&self) -> bool {
        self.filter_text.iter().any(|t| !t.trim().is_empty())
    }

    fn apply_filters(&mut self) {
        if self.columns.is_none() {
            return;
        }

        let mut candidates: Option<Vec<T>> = None;
        for (descriptor, text) in T::fields().iter().zip(&self.filter_text) {
            if text.trim().is_empty() {
                continue;
            }
            let needle = text.to_lowercase();
            let get = descriptor.get;
            let matches = |row: &T| {
                get(row)
                    .to_string()
                    .trim()
                    .to_lowercase()
                    .contains(&needle)
            };

            match candidates.as_mut() {
                None => {
                    candidates = Some(self.original.iter().filter(|r| matches(*r)).cloned().collect());
                }
                Some(rows) => rows.retain(|r| matches(r)),
            }
        }

        match candidates {
            Some(rows) => {
                self.filter_active = !rows.is_empty();
                self.filtered = rows;
            }
            None => {
                self.filter_active = false;
                self.filtered.clear();
            }
        }
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sort by `field`, alternating direction on each click of the same field.
    ///
    /// Each field remembers the direction of its last sort, ascending until
    /// first clicked. A click flips it and sorts the original rows in the
    /// new direction, so the first click on a field sorts descending. An
    /// active filter is reapplied so the filtered view keeps the new order.
    /// Jumps to page 1 and returns the direction applied. Does nothing before
    /// rows arrive.
    #[tracing::instrument(skip(self), target = "trellis::grid", level = "debug")]
    pub fn on_sort_click(&mut self, field: &str) -> Result<SortDirection, GridError> {
        let index = Self::field_index(field)?;
        let name = T::fields()[index].meta.name;
        let Some(columns) = self.columns.as_mut() else {
            return Ok(SortDirection::Descending);
        };

        let ascending = !columns.sort_ascending.get(name).copied().unwrap_or(true);
        let direction = if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };

        {
            let _perf = PerfSpan::new("grid.sort");
            sort_rows(&mut self.original, name, direction)?;
        }
        columns.sort_ascending.insert(name, ascending);

        if self.filter_active {
            self.apply_filters();
        }
        self.compute_paging();
        self.current_page = 1;
        self.refresh_page();

        self.changed.emit(GridChange::Sorted {
            field: name.to_string(),
            direction,
        });
        Ok(direction)
    }

    /// Direction the next click on `field` will sort in.
    pub fn next_sort_direction(&self, field: &str) -> SortDirection {
        let last_ascending = self
            .columns
            .as_ref()
            .and_then(|c| c.sort_ascending.get(field).copied())
            .unwrap_or(true);
        if last_ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    // =========================================================================
    // Summary
    // =========================================================================

    /// The summary line, or `None` when no summary field is configured.
    ///
    /// Aggregates the summary field over all original rows, ignoring filter
    /// and page. Values without a numeric reading count as `0.0`, and an
    /// empty row set aggregates a single `0.0`. The text is cached until
    /// the rows change or [`invalidate_summary`](Self::invalidate_summary)
    /// is called. Errors are rendered into the text after the title.
    pub fn summary_text(&mut self) -> Option<String> {
        let field = self.params.summary_field.clone()?;
        if let Some(text) = &self.summary {
            return Some(text.clone());
        }

        let title = &self.params.summary_title;
        let text = match self.summary_values(&field) {
            Ok(values) => {
                let aggregate = self.params.summary_kind.apply(&values);
                match format_number(aggregate, &self.params.summary_format) {
                    Ok(formatted) => format!("{title} {formatted}"),
                    Err(err) => format!("{title} {err}"),
                }
            }
            Err(err) => format!("{title} {err}"),
        };

        tracing::trace!(target: "trellis::grid", field = %field, summary = %text, "summary computed");
        self.summary = Some(text.clone());
        Some(text)
    }

    /// Drop the cached summary text.
    pub fn invalidate_summary(&mut self) {
        self.summary = None;
    }

    fn summary_values(&self, field: &str) -> Result<Vec<f64>, GridError> {
        let mut values = Vec::with_capacity(self.original.len().max(1));
        for row in &self.original {
            values.push(T::value_of(row, field)?.as_f64().unwrap_or(0.0));
        }
        if values.is_empty() {
            if T::field(field).is_none() {
                return Err(GridError::UnknownField {
                    type_name: T::type_name(),
                    field: field.to_string(),
                });
            }
            values.push(0.0);
        }
        Ok(values)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Change the title shown above the grid.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.params.title = title.into();
    }

    /// Signal emitted after each mutation.
    pub fn changed(&self) -> &Signal<GridChange> {
        &self.changed
    }

    pub fn is_initialized(&self) -> bool {
        self.columns.is_some()
    }

    /// Rows on the current page.
    pub fn visible_page(&self) -> &[T] {
        &self.visible
    }

    /// All rows, in their current sort order.
    pub fn rows(&self) -> &[T] {
        &self.original
    }

    /// Rows paging runs over: the filtered rows while a filter is active,
    /// the original rows otherwise.
    pub fn working_set(&self) -> &[T] {
        if self.filter_active {
            &self.filtered
        } else {
            &self.original
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }

    /// Metadata of the columns to render, in declaration order.
    pub fn visible_columns(&self) -> Vec<FieldMeta> {
        match &self.columns {
            Some(columns) => columns.table.visible().copied().collect(),
            None => FieldRegistry::field_metadata::<T>().visible().copied().collect(),
        }
    }

    /// Cell text for `field` of `row`, formatted with the field's format.
    ///
    /// Falls back to the raw value when the format does not apply, and to an
    /// empty string for unknown fields.
    pub fn display_value(&self, row: &T, field: &str) -> String {
        let Ok(value) = T::value_of(row, field) else {
            return String::new();
        };
        let format = T::field(field).and_then(|f| f.meta.format);
        format_value(&value, format).unwrap_or_else(|err| {
            tracing::debug!(target: "trellis::grid", field, error = %err, "format failed, showing raw value");
            value.to_string()
        })
    }

    /// The primary key value of `row`, if a primary key is configured.
    pub fn primary_key_value(&self, row: &T) -> Option<String> {
        let field = self.params.primary_key.as_deref()?;
        T::value_of(row, field).ok().map(|v| v.to_string())
    }

    /// Tooltip of `row`'s edit button.
    pub fn edit_button_title(&self, row: &T) -> String {
        let key = self.primary_key_value(row).unwrap_or_default();
        self.params.edit_button_title(&key)
    }

    fn field_index(field: &str) -> Result<usize, GridError> {
        T::fields()
            .iter()
            .position(|f| f.meta.name == field)
            .ok_or_else(|| GridError::UnknownField {
                type_name: T::type_name(),
                field: field.to_string(),
            })
    }

    fn refresh_page(&mut self) {
        let working = if self.filter_active {
            &self.filtered
        } else {
            &self.original
        };
        self.visible = if self.params.show_pager {
            working[page_range(self.current_page, self.params.page_size, working.len())].to_vec()
        } else {
            working.clone()
        };
    }
}

static_assertions::assert_impl_all!(GridModel<String>: Send);
