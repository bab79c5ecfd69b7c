/// Errors raised at the loading and session boundaries.
///
/// The query pipeline itself never fails: malformed cells degrade to sentinel
/// values and out-of-range pages are clamped. Only turning external text
/// (CSV, JSON, option bags) into host tables or options can go wrong, plus
/// addressing tables and instances by name from outside the process.

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("CSV is empty")]
    EmptyCsv,

    #[error("CSV header is empty")]
    EmptyHeader,

    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row} has {found} cells but the header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Table '{0}' not found")]
    UnknownTable(String),

    #[error("Table '{0}' has no header row or no body")]
    NotEnhanceable(String),

    #[error("Table '{0}' is not enhanced")]
    NotEnhanced(String),

    #[error("Instance has been destroyed")]
    Destroyed,
}

impl TableError {
    pub fn row_width(row: usize, expected: usize, found: usize) -> Self {
        TableError::RowWidth {
            row,
            expected,
            found,
        }
    }
}
