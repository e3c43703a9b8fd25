//! Page navigation.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::GridError;

/// A pager gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRequest {
    Next,
    Previous,
    First,
    Last,
    /// A 1-based page number. Out-of-range numbers are clamped.
    Number(i64),
}

impl PageRequest {
    /// Resolve against the current position, clamped into `[1, total_pages]`.
    pub fn resolve(self, current: usize, total_pages: usize) -> usize {
        let total = total_pages.max(1) as i64;
        let target = match self {
            PageRequest::Next => current as i64 + 1,
            PageRequest::Previous => current as i64 - 1,
            PageRequest::First => 1,
            PageRequest::Last => total,
            PageRequest::Number(n) => n,
        };
        target.clamp(1, total) as usize
    }
}

impl FromStr for PageRequest {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "next" => Ok(PageRequest::Next),
            "previous" => Ok(PageRequest::Previous),
            "first" => Ok(PageRequest::First),
            "last" => Ok(PageRequest::Last),
            other => other
                .parse::<i64>()
                .map(PageRequest::Number)
                .map_err(|_| GridError::InvalidPageRequest(s.to_string())),
        }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRequest::Next => f.write_str("next"),
            PageRequest::Previous => f.write_str("previous"),
            PageRequest::First => f.write_str("first"),
            PageRequest::Last => f.write_str("last"),
            PageRequest::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Number of pages needed for `rows` rows, never less than one.
pub fn page_count(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size.max(1)).max(1)
}

/// Index range of 1-based `page` within `len` rows.
pub fn page_range(page: usize, page_size: usize, len: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}
