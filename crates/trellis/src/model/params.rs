//! Grid configuration.

/// Aggregate applied by a grid's summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SummaryKind {
    /// Number of values.
    #[default]
    Count,
    /// Sum of values.
    Sum,
    /// Arithmetic mean of values.
    Average,
}

impl SummaryKind {
    /// Apply the aggregate.
    ///
    /// Averaging an empty slice yields `NaN`; the grid never passes one.
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            SummaryKind::Count => values.len() as f64,
            SummaryKind::Sum => values.iter().sum(),
            SummaryKind::Average => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

/// Caller-owned configuration of one grid.
///
/// The grid reads everything here. It writes back only `page_size` (forced
/// to the row count when paging is off) and `title` (through
/// [`GridModel::set_title`](super::GridModel::set_title)).
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    pub title: String,
    pub title_color: String,
    pub table_color: String,
    pub show_edit_column: bool,
    pub show_filter_row: bool,
    pub show_pager: bool,
    pub show_add_new: bool,
    pub page_size: usize,
    /// Field whose value identifies a row, used by edit actions.
    pub primary_key: Option<String>,
    pub edit_button_text: String,
    pub container_class: String,
    pub column_class: String,
    /// Field aggregated by the summary line. No summary line when unset.
    pub summary_field: Option<String>,
    pub summary_title: String,
    pub summary_kind: SummaryKind,
    /// Numeric format for the aggregate (e.g. `"N2"`). Empty means general.
    pub summary_format: String,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            title: "List".to_string(),
            title_color: "darkblue".to_string(),
            table_color: "darkblue".to_string(),
            show_edit_column: false,
            show_filter_row: false,
            show_pager: false,
            show_add_new: false,
            page_size: 5,
            primary_key: None,
            edit_button_text: "Edit".to_string(),
            container_class: "container-fluid".to_string(),
            column_class: "col-md".to_string(),
            summary_field: None,
            summary_title: String::new(),
            summary_kind: SummaryKind::Count,
            summary_format: String::new(),
        }
    }
}

impl GridParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Turn the pager on with `page_size` rows per page.
    pub fn with_pager(mut self, page_size: usize) -> Self {
        self.show_pager = true;
        self.page_size = page_size;
        self
    }

    pub fn with_filter_row(mut self, show: bool) -> Self {
        self.show_filter_row = show;
        self
    }

    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = Some(field.into());
        self
    }

    pub fn with_column_class(mut self, class: impl Into<String>) -> Self {
        self.column_class = class.into();
        self
    }

    /// Configure the summary line.
    pub fn with_summary(
        mut self,
        field: impl Into<String>,
        kind: SummaryKind,
        title: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        self.summary_field = Some(field.into());
        self.summary_kind = kind;
        self.summary_title = title.into();
        self.summary_format = format.into();
        self
    }

    /// Column class for a column `width` units wide, e.g. `col-md-3`.
    pub fn column_class_for(&self, width: u32) -> String {
        format!("{}-{}", self.column_class, width)
    }

    /// Container class for a container `width` units wide.
    pub fn container_class_for(&self, width: u32) -> String {
        format!("{}-{}", self.container_class, width)
    }

    /// Tooltip of a row's edit button.
    ///
    /// The trailing space is part of the rendered text.
    pub fn edit_button_title(&self, primary_key_value: &str) -> String {
        format!(
            "{} {} {} ",
            self.edit_button_text,
            self.primary_key.as_deref().unwrap_or_default(),
            primary_key_value
        )
    }
}
