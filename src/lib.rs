/// Table Enhancer - Client-Side Table Search, Sort and Pagination
///
/// Attaches a query engine to plain host tables: a case-insensitive
/// substring search, typed stable sorting on header click, and a windowed
/// pager. Each enhanced table gets an independent instance that only ever
/// toggles row visibility and header markers, and `destroy` puts the table
/// back the way it was found.

pub mod error;
pub mod table;
pub mod column;
pub mod value;
pub mod snapshot;
pub mod view;
pub mod pagination;
pub mod options;
pub mod presenter;
pub mod instance;

pub use error::TableError;
pub use table::{BodyRow, ColumnSource, Document, HeaderCell, Table, TableHandle, TableSource};
pub use column::{ColumnType, ColumnTyping, LEGACY_TYPE_MARKER, TYPE_MARKER};
pub use value::{parse_date, parse_number, SortValue};
pub use snapshot::{RowRecord, RowSnapshot};
pub use view::{QueryState, SortKey, SortOrder};
pub use pagination::{PageButton, PageWindow};
pub use options::{InfoLabel, Labels, Options};
pub use presenter::{Controls, Presenter, RenderFrame, TextPresenter};
pub use instance::{enhance, TableInstance, Target, SORTABLE_MARKER, SORT_DIR_MARKER};

// Python bindings - only when python feature is enabled
#[cfg(feature = "python")]
mod python_bindings;
#[cfg(feature = "python")]
pub use python_bindings::*;

// WebSocket server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod websocket;
#[cfg(feature = "server")]
pub mod server;
