//! Row types shared by the model tests.

use trellis_macros::GridRow;

#[derive(Debug, Clone, PartialEq, GridRow)]
pub struct Reading {
    #[grid(hidden)]
    pub id: i64,
    #[grid(filterable)]
    pub label: String,
    #[grid(filterable)]
    pub site: String,
    #[grid(align = "right", format = "N1")]
    pub value: f64,
}

/// Readings with the given ids and values and empty text fields.
pub fn readings(rows: &[(i64, f64)]) -> Vec<Reading> {
    rows.iter()
        .map(|&(id, value)| Reading {
            id,
            label: String::new(),
            site: String::new(),
            value,
        })
        .collect()
}
