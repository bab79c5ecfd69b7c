/// Query engine.
///
/// Two composable passes over a `RowSnapshot`: a substring filter and a
/// stable typed sort. Both produce a working set, a list of source indices
/// in display order. The passes are pure; `QueryState` holds the inputs and
/// is the only thing interactions mutate.

use crate::column::ColumnTyping;
use crate::snapshot::RowSnapshot;
use crate::value::{parse_value, SortValue};
use serde::Serialize;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    #[serde(rename = "asc")]
    Ascending,
    /// Descending order (largest first)
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// Marker value written to the sorted header cell.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// The active sort: a column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub column: usize,
    pub order: SortOrder,
}

impl SortKey {
    pub fn ascending(column: usize) -> Self {
        SortKey {
            column,
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(column: usize) -> Self {
        SortKey {
            column,
            order: SortOrder::Descending,
        }
    }
}

/// Mutable per-instance query inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub search_term: String,
    pub sort: Option<SortKey>,
    pub page_size: usize,
    pub current_page: usize,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        QueryState {
            search_term: String::new(),
            sort: None,
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    ///
    /// ```
    /// use table_enhancer::{QueryState, SortKey};
    ///
    /// let mut state = QueryState::new(10);
    /// state.click_header(2);
    /// state.click_header(2);
    /// assert_eq!(state.sort, Some(SortKey::descending(2)));
    /// state.click_header(0);
    /// assert_eq!(state.sort, Some(SortKey::ascending(0)));
    /// ```
    pub fn click_header(&mut self, column: usize) {
        self.sort = Some(match self.sort {
            Some(key) if key.column == column => SortKey {
                column,
                order: key.order.toggled(),
            },
            _ => SortKey::ascending(column),
        });
    }
}

/// Filter pass: source indices of rows containing `term`, in snapshot order.
///
/// `term` is trimmed and lowercased here; an empty term keeps every row.
pub fn filter_rows(snapshot: &RowSnapshot, term: &str) -> Vec<usize> {
    let term = term.trim().to_lowercase();
    snapshot
        .iter()
        .filter(|r| term.is_empty() || r.normalized_text().contains(&term))
        .map(|r| r.source_index())
        .collect()
}

/// Sort pass: reorders `working` by the parsed values of `key.column`.
///
/// Keys are parsed once per row. The sort is stable in both directions:
/// descending reverses the comparison, never the order of equal rows.
pub fn sort_rows(snapshot: &RowSnapshot, working: &mut Vec<usize>, key: SortKey, typing: &ColumnTyping) {
    let mut keyed: Vec<(SortValue, usize)> = working
        .iter()
        .map(|&i| {
            let value = snapshot
                .get(i)
                .map(|r| parse_value(r, key.column, typing))
                .unwrap_or(SortValue::Number(0.0));
            (value, i)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let cmp = a.compare(b);
        match key.order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });

    working.clear();
    working.extend(keyed.into_iter().map(|(_, i)| i));
}

/// Runs filter then sort for the current state.
pub fn run_query(snapshot: &RowSnapshot, state: &QueryState, typing: &ColumnTyping) -> Vec<usize> {
    let mut working = filter_rows(snapshot, &state.search_term);
    if let Some(key) = state.sort {
        sort_rows(snapshot, &mut working, key, typing);
    }
    working
}
