//! Field metadata for grid rows.
//!
//! Every row type shown in a grid carries a static field table: one
//! [`FieldDescriptor`] per declared field, in declaration order, pairing the
//! field's display [`FieldMeta`] with a typed accessor. The table is normally
//! generated by `#[derive(GridRow)]`:
//!
//! ```ignore
//! use trellis_macros::GridRow;
//!
//! #[derive(Clone, GridRow)]
//! struct Invoice {
//!     #[grid(filterable)]
//!     customer: String,
//!     #[grid(align = "right", format = "C2")]
//!     total: f64,
//!     #[grid(hidden)]
//!     internal_note: String,
//! }
//! ```
//!
//! Lookups go through [`FieldRegistry`], which derives a [`FieldTable`] once
//! per type and caches it for the process lifetime.

mod registry;
mod value;

pub use registry::{FieldRegistry, FieldTable};
pub use value::{FieldValue, ToFieldValue};

use std::str::FromStr;

use crate::error::MetaError;

/// Horizontal alignment of a grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    /// Align to the left edge.
    #[default]
    Left,
    /// Align to the center.
    Center,
    /// Align to the right edge.
    Right,
}

impl Align {
    /// Parse an alignment name, falling back to `Left` for anything unknown.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Lowercase name, as used in markup.
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl FromStr for Align {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            _ => Err(()),
        }
    }
}

/// Display configuration of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Field name as declared on the row type.
    pub name: &'static str,
    /// Whether the column is rendered.
    pub show_in_grid: bool,
    /// Whether the column header accepts sort clicks.
    pub sortable: bool,
    /// Whether the filter row offers an input for this column.
    pub filterable: bool,
    /// Cell alignment.
    pub align: Align,
    /// Optional display format string (e.g. `"N2"`, `"g"`).
    pub format: Option<&'static str>,
}

impl FieldMeta {
    /// Visible, sortable, not filterable, left-aligned, unformatted.
    pub const DEFAULT: FieldMeta = FieldMeta {
        name: "",
        show_in_grid: true,
        sortable: true,
        filterable: false,
        align: Align::Left,
        format: None,
    };

    /// Default metadata for a named field.
    pub const fn named(name: &'static str) -> Self {
        FieldMeta {
            name,
            ..Self::DEFAULT
        }
    }
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One entry of a row type's static field table.
pub struct FieldDescriptor<T> {
    /// Display metadata.
    pub meta: FieldMeta,
    /// Reads the field off a row.
    pub get: fn(&T) -> FieldValue,
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// A row type with a statically declared field table.
pub trait GridRow: Sized + 'static {
    /// Fields in declaration order.
    fn fields() -> &'static [FieldDescriptor<Self>];

    /// Short type name used in diagnostics.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("row")
    }

    /// Look up a field descriptor by name.
    fn field(name: &str) -> Option<&'static FieldDescriptor<Self>> {
        Self::fields().iter().find(|f| f.meta.name == name)
    }

    /// Read a named field off `row`.
    fn value_of(row: &Self, name: &str) -> Result<FieldValue, MetaError> {
        Self::field(name)
            .map(|f| (f.get)(row))
            .ok_or_else(|| MetaError::UnknownField {
                type_name: Self::type_name(),
                field: name.to_string(),
            })
    }
}


#[cfg(test)]
mod tests {
    use super::test_rows::Item;
    use super::*;

    #[test]
    fn test_align_parsing() {
        assert_eq!(Align::parse_lenient("Right"), Align::Right);
        assert_eq!(Align::parse_lenient(" center "), Align::Center);
        assert_eq!(Align::parse_lenient("justify"), Align::Left);
        assert_eq!(Align::Right.as_str(), "right");
    }

    #[test]
    fn test_field_meta_defaults() {
        let meta = FieldMeta::named("x");
        assert!(meta.show_in_grid);
        assert!(meta.sortable);
        assert!(!meta.filterable);
        assert_eq!(meta.align, Align::Left);
        assert_eq!(meta.format, None);
    }

    #[test]
    fn test_value_of() {
        let item = Item {
            id: 4,
            label: "Widget".into(),
            price: 2.5,
        };
        assert_eq!(Item::value_of(&item, "label").unwrap(), FieldValue::from("Widget"));
        assert_eq!(Item::type_name(), "Item");

        let err = Item::value_of(&item, "nope").unwrap_err();
        assert_eq!(
            err,
            MetaError::UnknownField {
                type_name: "Item",
                field: "nope".into()
            }
        );
    }
}
