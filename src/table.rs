/// Host document model.
///
/// A `Table` is the host-side table an instance is attached to: an optional
/// header row of cells carrying attributes, and an optional body of rows that
/// can be hidden or shown. A `Document` is an ordered collection of tables
/// that can be queried with simple selectors.
///
/// The enhancer never adds, removes or edits rows. It only toggles
/// visibility and sets or clears its own header attributes.
///
/// # Examples
///
/// ```
/// use table_enhancer::{BodyRow, HeaderCell, Table};
///
/// let table = Table::new()
///     .with_id("scores")
///     .with_header(vec![
///         HeaderCell::new("Name"),
///         HeaderCell::new("Score").with_attribute("data-column-type", "number"),
///     ])
///     .with_body(vec![
///         BodyRow::new(vec!["Alice", "5"]),
///         BodyRow::new(vec!["  bob ", "12"]),
///     ]);
///
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.cell_text(1, 0), "bob");
/// assert_eq!(table.cell_text(1, 7), "");
/// ```

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared handle to a host table.
///
/// Instances and documents both refer to the same table, so it lives behind
/// `Rc<RefCell<..>>` like any other single-threaded shared node.
pub type TableHandle = Rc<RefCell<Table>>;

/// A header cell: display text plus free-form attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderCell {
    text: String,
    attributes: BTreeMap<String, String>,
}

impl HeaderCell {
    pub fn new(text: impl Into<String>) -> Self {
        HeaderCell {
            text: text.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// A body row: raw cell texts and a visibility flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyRow {
    cells: Vec<String>,
    hidden: bool,
}

impl BodyRow {
    pub fn new<S: Into<String>>(cells: Vec<S>) -> Self {
        BodyRow {
            cells: cells.into_iter().map(Into::into).collect(),
            hidden: false,
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// A host table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    id: Option<String>,
    classes: Vec<String>,
    header: Option<Vec<HeaderCell>>,
    body: Option<Vec<BodyRow>>,
}

impl Table {
    /// Creates a table with neither header nor body.
    pub fn new() -> Self {
        Table::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_header(mut self, cells: Vec<HeaderCell>) -> Self {
        self.header = Some(cells);
        self
    }

    pub fn with_body(mut self, rows: Vec<BodyRow>) -> Self {
        self.body = Some(rows);
        self
    }

    /// Wraps the table into a shared handle.
    pub fn into_handle(self) -> TableHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Header cells, or `None` when there is no usable header row.
    ///
    /// A header row without any cells counts as missing.
    pub fn header_cells(&self) -> Option<&[HeaderCell]> {
        self.header
            .as_deref()
            .filter(|cells| !cells.is_empty())
    }

    pub fn header_cell_mut(&mut self, column: usize) -> Option<&mut HeaderCell> {
        self.header.as_mut().and_then(|cells| cells.get_mut(column))
    }

    pub fn column_count(&self) -> usize {
        self.header.as_ref().map_or(0, Vec::len)
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn rows(&self) -> &[BodyRow] {
        self.body.as_deref().unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    /// Trimmed text of a cell. Missing rows and cells read as empty.
    pub fn cell_text(&self, row: usize, column: usize) -> &str {
        self.rows()
            .get(row)
            .and_then(|r| r.cells.get(column))
            .map_or("", |c| c.trim())
    }

    /// All cell texts of a row joined by a single space.
    pub fn row_text(&self, row: usize) -> String {
        self.rows()
            .get(row)
            .map(|r| r.cells.join(" "))
            .unwrap_or_default()
    }

    pub fn set_row_hidden(&mut self, row: usize, hidden: bool) {
        if let Some(r) = self.body.as_mut().and_then(|rows| rows.get_mut(row)) {
            r.hidden = hidden;
        }
    }

    pub fn is_row_hidden(&self, row: usize) -> bool {
        self.rows().get(row).is_some_and(|r| r.hidden)
    }

    /// Hides every row except the listed ones.
    pub fn show_only(&mut self, visible: &[usize]) {
        if let Some(rows) = self.body.as_mut() {
            for r in rows.iter_mut() {
                r.hidden = true;
            }
            for &i in visible {
                if let Some(r) = rows.get_mut(i) {
                    r.hidden = false;
                }
            }
        }
    }

    pub fn show_all(&mut self) {
        if let Some(rows) = self.body.as_mut() {
            for r in rows.iter_mut() {
                r.hidden = false;
            }
        }
    }

    /// Indices of rows currently shown, in body order.
    pub fn visible_row_indices(&self) -> Vec<usize> {
        self.rows()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.hidden)
            .map(|(i, _)| i)
            .collect()
    }

    /// Does this table match a single compound selector such as `table.x#y`?
    fn matches_compound(&self, compound: &str) -> bool {
        if compound == "*" {
            return true;
        }
        let rest = compound.strip_prefix("table").unwrap_or(compound);
        if rest.is_empty() {
            // bare `table`, or an empty compound
            return !compound.is_empty();
        }

        let mut parts = Vec::new();
        let mut start = None;
        for (i, c) in rest.char_indices() {
            if c == '#' || c == '.' {
                if let Some(s) = start {
                    parts.push(&rest[s..i]);
                }
                start = Some(i);
            } else if start.is_none() || !(c.is_alphanumeric() || c == '-' || c == '_') {
                return false;
            }
        }
        if let Some(s) = start {
            parts.push(&rest[s..]);
        }

        parts.iter().all(|part| {
            let name = &part[1..];
            if name.is_empty() {
                return false;
            }
            match part.as_bytes()[0] {
                b'#' => self.id.as_deref() == Some(name),
                _ => self.has_class(name),
            }
        })
    }

    /// Does this table match a selector list such as `table.stats, #summary`?
    ///
    /// Only tag, id, class and universal selectors are understood. Anything
    /// else (combinators, attribute selectors) matches nothing.
    pub fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .any(|compound| self.matches_compound(compound))
    }

    // ========================================================================
    // Loading and export
    // ========================================================================

    /// Create a table from a CSV string.
    ///
    /// The first record becomes the header row, every following non-blank
    /// record a body row. Quoted fields may contain commas, doubled quotes
    /// and newlines.
    ///
    /// # Example
    ///
    /// ```
    /// use table_enhancer::Table;
    ///
    /// let csv = "name,score\nAlice,5\n\"Smith, Bob\",12";
    /// let table = Table::from_csv("scores", csv).unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.cell_text(1, 0), "Smith, Bob");
    /// ```
    pub fn from_csv(id: &str, csv: &str) -> Result<Table, TableError> {
        let mut records = parse_csv_rows(csv)?;
        if records.is_empty() {
            return Err(TableError::EmptyCsv);
        }

        let header = records.remove(0);
        if header.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::EmptyHeader);
        }

        let mut rows = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }
            if record.len() > header.len() {
                return Err(TableError::row_width(i + 1, header.len(), record.len()));
            }
            rows.push(BodyRow::new(record));
        }

        Ok(Table::new()
            .with_id(id)
            .with_header(header.into_iter().map(HeaderCell::new).collect())
            .with_body(rows))
    }

    /// Create a table from a JSON `TableSource` document.
    ///
    /// # Example
    ///
    /// ```
    /// use table_enhancer::Table;
    ///
    /// let json = r#"{
    ///     "id": "players",
    ///     "columns": [{"text": "Name"}, {"text": "Joined", "type": "date"}],
    ///     "rows": [["Alice", "2024-01-15"], ["Bob", "2023-06-01"]]
    /// }"#;
    /// let table = Table::from_json(json).unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.header_cells().unwrap()[1].attribute("data-column-type"), Some("date"));
    /// ```
    pub fn from_json(json: &str) -> Result<Table, TableError> {
        let source: TableSource = serde_json::from_str(json)?;
        source.into_table()
    }

    /// Snapshot of the table's authored content, without visibility state.
    pub fn to_source(&self) -> TableSource {
        TableSource {
            id: self.id.clone(),
            classes: self.classes.clone(),
            columns: self
                .header
                .iter()
                .flatten()
                .map(|cell| ColumnSource {
                    text: cell.text.clone(),
                    column_type: cell.attribute(crate::column::TYPE_MARKER).map(str::to_string),
                })
                .collect(),
            rows: self.rows().iter().map(|r| r.cells.clone()).collect(),
        }
    }
}

/// Serializable description of a host table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    pub columns: Vec<ColumnSource>,
    pub rows: Vec<Vec<String>>,
}

/// Serializable header cell: text and optional type marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnSource {
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

impl TableSource {
    pub fn into_table(self) -> Result<Table, TableError> {
        let width = self.columns.len();
        if let Some((i, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() > width) {
            return Err(TableError::row_width(i + 1, width, row.len()));
        }

        let header = self
            .columns
            .into_iter()
            .map(|c| {
                let cell = HeaderCell::new(c.text);
                match c.column_type {
                    Some(t) => cell.with_attribute(crate::column::TYPE_MARKER, t),
                    None => cell,
                }
            })
            .collect();

        let mut table = Table::new()
            .with_header(header)
            .with_body(self.rows.into_iter().map(BodyRow::new).collect());
        table.id = self.id;
        table.classes = self.classes;
        Ok(table)
    }
}

/// An ordered collection of host tables.
#[derive(Debug, Default)]
pub struct Document {
    tables: Vec<TableHandle>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Adds a table and returns the shared handle to it.
    pub fn add_table(&mut self, table: Table) -> TableHandle {
        let handle = table.into_handle();
        self.tables.push(handle.clone());
        handle
    }

    pub fn tables(&self) -> &[TableHandle] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All tables matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Vec<TableHandle> {
        self.tables
            .iter()
            .filter(|t| t.borrow().matches(selector))
            .cloned()
            .collect()
    }
}

/// Parse a CSV string into records, handling quoted fields with embedded newlines
fn parse_csv_rows(csv: &str) -> Result<Vec<Vec<String>>, TableError> {
    let mut rows = Vec::new();
    let mut current_row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current_field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                quote_line = line;
            }
            ',' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
            }
            '\n' if !in_quotes => {
                line += 1;
                current_row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut current_row));
            }
            '\r' if !in_quotes => {}
            _ => {
                if c == '\n' {
                    line += 1;
                }
                current_field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { line: quote_line });
    }

    if !current_field.is_empty() || !current_row.is_empty() {
        current_row.push(current_field);
        rows.push(current_row);
    }

    Ok(rows)
}
