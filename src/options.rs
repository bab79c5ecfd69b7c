/// Enhancement options.
///
/// Every field is optional; missing values take the documented defaults.
/// Options can be built in code with the `with_*` setters or parsed from a
/// JSON option bag using camelCase keys.
///
/// # Examples
///
/// ```
/// use table_enhancer::Options;
///
/// let options = Options::from_json(r#"{
///     "perPageOptions": [5, 20],
///     "numericCols": [1],
///     "labels": { "noData": "Nothing here" }
/// }"#).unwrap();
///
/// assert_eq!(options.initial_page_size(), 5);
/// assert_eq!(options.labels.no_data, "Nothing here");
/// assert_eq!(options.labels.rows, "Rows");
/// ```

use crate::error::TableError;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

pub const DEFAULT_INFO_TEMPLATE: &str = "Showing {start}–{end} of {total} entries";

/// Closure producing the info line from `(start, end, total)`.
pub type InfoFn = Arc<dyn Fn(usize, usize, usize) -> String + Send + Sync>;

/// How the "showing x to y of z" line is produced.
#[derive(Clone)]
pub enum InfoLabel {
    /// Text with `{start}`, `{end}` and `{total}` placeholders.
    Template(String),
    Custom(InfoFn),
}

impl InfoLabel {
    pub fn format(&self, start: usize, end: usize, total: usize) -> String {
        match self {
            InfoLabel::Template(template) => template
                .replace("{start}", &start.to_string())
                .replace("{end}", &end.to_string())
                .replace("{total}", &total.to_string()),
            InfoLabel::Custom(f) => f(start, end, total),
        }
    }
}

impl Default for InfoLabel {
    fn default() -> Self {
        InfoLabel::Template(DEFAULT_INFO_TEMPLATE.to_string())
    }
}

impl fmt::Debug for InfoLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoLabel::Template(t) => f.debug_tuple("Template").field(t).finish(),
            InfoLabel::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for InfoLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(InfoLabel::Template)
    }
}

/// User-facing strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub search: String,
    pub search_placeholder: String,
    pub rows: String,
    pub info: InfoLabel,
    pub no_data: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            search: "Search".to_string(),
            search_placeholder: "Search…".to_string(),
            rows: "Rows".to_string(),
            info: InfoLabel::default(),
            no_data: "No data".to_string(),
        }
    }
}

/// Configuration shared by every table passed to one `enhance` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Selectable page sizes. Empty means the defaults.
    pub per_page_options: Vec<usize>,
    /// Initial page size. `None` or 0 means the first selectable size.
    pub per_page: Option<usize>,
    pub labels: Labels,
    pub numeric_cols: Vec<usize>,
    pub date_cols: Vec<usize>,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_per_page_options(mut self, sizes: Vec<usize>) -> Self {
        self.per_page_options = sizes;
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_info<F>(mut self, info: F) -> Self
    where
        F: Fn(usize, usize, usize) -> String + Send + Sync + 'static,
    {
        self.labels.info = InfoLabel::Custom(Arc::new(info));
        self
    }

    pub fn with_numeric_cols(mut self, cols: Vec<usize>) -> Self {
        self.numeric_cols = cols;
        self
    }

    pub fn with_date_cols(mut self, cols: Vec<usize>) -> Self {
        self.date_cols = cols;
        self
    }

    /// Page sizes offered to the user, with zero sizes dropped.
    pub fn page_size_choices(&self) -> Vec<usize> {
        let sizes: Vec<usize> = self
            .per_page_options
            .iter()
            .copied()
            .filter(|&n| n > 0)
            .collect();
        if sizes.is_empty() {
            DEFAULT_PER_PAGE_OPTIONS.to_vec()
        } else {
            sizes
        }
    }

    /// Fallback page size: the first choice.
    pub fn default_page_size(&self) -> usize {
        self.page_size_choices()[0]
    }

    pub fn initial_page_size(&self) -> usize {
        match self.per_page {
            Some(n) if n > 0 => n,
            _ => self.default_page_size(),
        }
    }
}
