//! Sorting rows by a named field.

use std::cmp::Reverse;
use std::fmt;

use trellis_core::GridRow;

use crate::error::GridError;

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Map a direction literal. Only `"asc"` (any case) is ascending; every
    /// other literal, including unrecognized ones, sorts descending.
    pub fn from_literal(literal: &str) -> Self {
        if literal.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn as_literal(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_literal())
    }
}

/// Stable in-place sort of `rows` by the value of `field`.
///
/// Each row's key is read once through the field's accessor and compared by
/// [`FieldValue`](trellis_core::FieldValue)'s total order. Rows with equal
/// keys keep their relative order in both directions.
pub fn sort_rows<T: GridRow>(
    rows: &mut [T],
    field: &str,
    direction: SortDirection,
) -> Result<(), GridError> {
    let descriptor = T::field(field).ok_or_else(|| GridError::UnknownField {
        type_name: T::type_name(),
        field: field.to_string(),
    })?;
    let get = descriptor.get;

    match direction {
        SortDirection::Ascending => rows.sort_by_cached_key(|row| get(row)),
        SortDirection::Descending => rows.sort_by_cached_key(|row| Reverse(get(row))),
    }

    tracing::trace!(
        target: "trellis::grid",
        type_name = T::type_name(),
        field,
        %direction,
        rows = rows.len(),
        "sorted rows"
    );
    Ok(())
}

/// Sorted copy of `rows`.
pub fn sorted<T: GridRow + Clone>(
    rows: &[T],
    field: &str,
    direction: SortDirection,
) -> Result<Vec<T>, GridError> {
    let mut out = rows.to_vec();
    sort_rows(&mut out, field, direction)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_rows::{Reading, readings};

    fn ids(rows: &[Reading]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_direction_literals() {
        assert_eq!(SortDirection::from_literal("asc"), SortDirection::Ascending);
        assert_eq!(SortDirection::from_literal("ASC"), SortDirection::Ascending);
        assert_eq!(SortDirection::from_literal("desc"), SortDirection::Descending);
        assert_eq!(SortDirection::from_literal("upward"), SortDirection::Descending);
        assert_eq!(SortDirection::from_literal(""), SortDirection::Descending);
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let rows = readings(&[(1, 10.0), (2, 30.0), (3, 20.0)]);

        let asc = sorted(&rows, "value", SortDirection::Ascending).unwrap();
        assert_eq!(ids(&asc), vec![1, 3, 2]);

        let desc = sorted(&rows, "value", SortDirection::Descending).unwrap();
        assert_eq!(ids(&desc), vec![2, 3, 1]);
    }

    #[test]
    fn test_descending_is_reverse_of_ascending_without_ties() {
        let rows = readings(&[(4, 0.5), (1, -2.0), (7, 9.25), (2, 3.0), (9, 1.0)]);
        let mut asc = sorted(&rows, "value", SortDirection::Ascending).unwrap();
        let desc = sorted(&rows, "value", SortDirection::Descending).unwrap();
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let rows = readings(&[(1, 5.0), (2, 1.0), (3, 5.0), (4, 1.0)]);

        let asc = sorted(&rows, "value", SortDirection::Ascending).unwrap();
        assert_eq!(ids(&asc), vec![2, 4, 1, 3]);

        let desc = sorted(&rows, "value", SortDirection::Descending).unwrap();
        assert_eq!(ids(&desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_text_field() {
        let mut rows = readings(&[(1, 0.0), (2, 0.0), (3, 0.0)]);
        rows[0].label = "pear".into();
        rows[1].label = "apple".into();
        rows[2].label = "fig".into();
        sort_rows(&mut rows, "label", SortDirection::Ascending).unwrap();
        assert_eq!(ids(&rows), vec![2, 3, 1]);
    }

    #[test]
    fn test_unknown_field_fails() {
        let mut rows = readings(&[(1, 1.0)]);
        let err = sort_rows(&mut rows, "missing", SortDirection::Ascending).unwrap_err();
        assert!(matches!(err, GridError::UnknownField { ref field, .. } if field == "missing"));
    }
}
