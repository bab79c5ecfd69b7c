/// Row snapshot.
///
/// Captured once when an instance is created. Each record keeps the row's
/// position in the host body, its trimmed cell texts for typed parsing, and
/// a normalized string for search. Nothing here changes afterwards.

use crate::table::Table;

/// Immutable capture of one body row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    source_index: usize,
    normalized_text: String,
    cells: Vec<String>,
}

impl RowRecord {
    pub fn new<S: AsRef<str>>(source_index: usize, cells: &[S]) -> Self {
        let joined = cells
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        RowRecord {
            source_index,
            normalized_text: normalize_text(&joined),
            cells: cells.iter().map(|c| c.as_ref().trim().to_string()).collect(),
        }
    }

    /// Position of the row in the host table body.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Lowercased row text with whitespace runs collapsed to one space.
    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    /// Trimmed text of a cell; empty when the row is shorter than `column`.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map_or("", String::as_str)
    }
}

/// The fixed set of rows an instance works on.
#[derive(Debug, Clone, Default)]
pub struct RowSnapshot {
    records: Vec<RowRecord>,
}

impl RowSnapshot {
    /// Captures every body row of `table` in body order.
    pub fn capture(table: &Table) -> Self {
        let records = table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| RowRecord::new(i, row.cells()))
            .collect();
        RowSnapshot { records }
    }

    pub fn from_records(records: Vec<RowRecord>) -> Self {
        RowSnapshot { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, source_index: usize) -> Option<&RowRecord> {
        self.records.get(source_index)
    }

    pub fn records(&self) -> &[RowRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowRecord> {
        self.records.iter()
    }
}

/// Lowercases and collapses whitespace runs, trimming both ends.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
