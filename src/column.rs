/// Column typing.
///
/// Every column of an enhanced table is compared as text, as a number or as
/// a date. The type comes from a marker attribute on the header cell, from
/// index lists supplied by the caller, or both.

use crate::table::HeaderCell;
use serde::Serialize;
use std::collections::BTreeSet;

/// Header attribute carrying an author-supplied column type.
pub const TYPE_MARKER: &str = "data-column-type";

/// Older spelling of `TYPE_MARKER`, still read when the new one is absent.
pub const LEGACY_TYPE_MARKER: &str = "data-vte";

/// Semantic column type used for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Numeric,
    Date,
}

impl ColumnType {
    /// Recognizes a marker value. Unknown values are not an error, they
    /// simply leave the column as text.
    pub fn from_marker(marker: &str) -> Option<Self> {
        if marker.eq_ignore_ascii_case("number") {
            Some(ColumnType::Numeric)
        } else if marker.eq_ignore_ascii_case("date") {
            Some(ColumnType::Date)
        } else {
            None
        }
    }
}

/// Per-table split of column indices into numeric and date sets.
///
/// Any index in neither set is text. An index present in both is numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTyping {
    numeric: BTreeSet<usize>,
    date: BTreeSet<usize>,
}

impl ColumnTyping {
    /// Resolves typing from header markers merged with caller-supplied lists.
    ///
    /// `TYPE_MARKER` takes precedence over `LEGACY_TYPE_MARKER` on the same
    /// cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use table_enhancer::{ColumnType, ColumnTyping, HeaderCell};
    ///
    /// let header = vec![
    ///     HeaderCell::new("Name"),
    ///     HeaderCell::new("Score").with_attribute("data-column-type", "Number"),
    ///     HeaderCell::new("Joined").with_attribute("data-column-type", "timestamp"),
    /// ];
    /// let typing = ColumnTyping::resolve(&header, &[], &[2]);
    ///
    /// assert_eq!(typing.column_type(0), ColumnType::Text);
    /// assert_eq!(typing.column_type(1), ColumnType::Numeric);
    /// assert_eq!(typing.column_type(2), ColumnType::Date);
    /// ```
    pub fn resolve(header: &[HeaderCell], numeric_cols: &[usize], date_cols: &[usize]) -> Self {
        let mut numeric: BTreeSet<usize> = numeric_cols.iter().copied().collect();
        let mut date: BTreeSet<usize> = date_cols.iter().copied().collect();

        for (i, cell) in header.iter().enumerate() {
            let marker = cell
                .attribute(TYPE_MARKER)
                .or_else(|| cell.attribute(LEGACY_TYPE_MARKER));
            match marker.and_then(ColumnType::from_marker) {
                Some(ColumnType::Numeric) => {
                    numeric.insert(i);
                }
                Some(ColumnType::Date) => {
                    date.insert(i);
                }
                _ => {}
            }
        }

        ColumnTyping { numeric, date }
    }

    pub fn column_type(&self, column: usize) -> ColumnType {
        if self.numeric.contains(&column) {
            ColumnType::Numeric
        } else if self.date.contains(&column) {
            ColumnType::Date
        } else {
            ColumnType::Text
        }
    }

    pub fn numeric(&self) -> &BTreeSet<usize> {
        &self.numeric
    }

    pub fn date(&self) -> &BTreeSet<usize> {
        &self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_case_insensitive() {
        assert_eq!(ColumnType::from_marker("NUMBER"), Some(ColumnType::Numeric));
        assert_eq!(ColumnType::from_marker("Date"), Some(ColumnType::Date));
        assert_eq!(ColumnType::from_marker("numeric"), None);
        assert_eq!(ColumnType::from_marker(""), None);
    }

    #[test]
    fn test_resolve_unions_markers_and_lists() {
        let header = vec![
            HeaderCell::new("a").with_attribute(TYPE_MARKER, "date"),
            HeaderCell::new("b"),
            HeaderCell::new("c").with_attribute(TYPE_MARKER, "number"),
            HeaderCell::new("d").with_attribute(TYPE_MARKER, "currency"),
        ];
        let typing = ColumnTyping::resolve(&header, &[1], &[3]);

        assert_eq!(typing.numeric().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(typing.date().iter().copied().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_legacy_marker_is_read() {
        let header = vec![
            HeaderCell::new("a").with_attribute(LEGACY_TYPE_MARKER, "number"),
            HeaderCell::new("b").with_attribute(LEGACY_TYPE_MARKER, "DATE"),
            HeaderCell::new("c")
                .with_attribute(TYPE_MARKER, "date")
                .with_attribute(LEGACY_TYPE_MARKER, "number"),
        ];
        let typing = ColumnTyping::resolve(&header, &[], &[]);

        assert_eq!(typing.column_type(0), ColumnType::Numeric);
        assert_eq!(typing.column_type(1), ColumnType::Date);
        assert_eq!(typing.column_type(2), ColumnType::Date);
    }

    #[test]
    fn test_numeric_wins_over_date() {
        let typing = ColumnTyping::resolve(&[], &[0], &[0]);
        assert_eq!(typing.column_type(0), ColumnType::Numeric);
    }

    #[test]
    fn test_indices_beyond_header_are_kept() {
        // caller lists are not validated against the header width
        let typing = ColumnTyping::resolve(&[HeaderCell::new("only")], &[7], &[]);
        assert_eq!(typing.column_type(7), ColumnType::Numeric);
        assert_eq!(typing.column_type(8), ColumnType::Text);
    }
}
