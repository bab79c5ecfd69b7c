/// Python bindings for the table enhancer using PyO3
///
/// Exposes host tables, the `enhance` entry point and the per-table
/// `Instance` with its interaction methods. Every interaction returns a
/// `Frame` describing what is now on screen.

use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::error::TableError;
use crate::instance::{enhance as enhance_target, TableInstance};
use crate::options::{Labels, Options};
use crate::pagination::PageButton;
use crate::presenter::RenderFrame;
use crate::table::{ColumnSource, Table as RustTable, TableHandle, TableSource};

impl From<TableError> for PyErr {
    fn from(e: TableError) -> PyErr {
        match e {
            TableError::Destroyed => PyRuntimeError::new_err(e.to_string()),
            _ => PyValueError::new_err(e.to_string()),
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// A host table: header cells and body rows.
#[pyclass(name = "Table", unsendable)]
pub struct PyTable {
    inner: TableHandle,
}

#[pymethods]
impl PyTable {
    /// Create a new table.
    ///
    /// Args:
    ///     columns: Header texts
    ///     rows: Body rows, each a list of cell texts
    ///     id: Optional table id
    ///     classes: Optional class names
    ///     column_types: Optional per-column type markers ("number", "date" or None)
    ///
    /// Examples:
    ///     table = Table(["Name", "Score"], [["Alice", "5"], ["bob", "12"]],
    ///                   column_types=[None, "number"])
    #[new]
    #[pyo3(signature = (columns, rows, id=None, classes=None, column_types=None))]
    fn new(
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        id: Option<String>,
        classes: Option<Vec<String>>,
        column_types: Option<Vec<Option<String>>>,
    ) -> PyResult<Self> {
        let types = column_types.unwrap_or_default();
        if types.len() > columns.len() {
            return Err(PyValueError::new_err(format!(
                "{} column types given for {} columns",
                types.len(),
                columns.len()
            )));
        }

        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, text)| ColumnSource {
                text,
                column_type: types.get(i).cloned().flatten(),
            })
            .collect();
        let source = TableSource {
            id,
            classes: classes.unwrap_or_default(),
            columns,
            rows,
        };
        Ok(PyTable {
            inner: source.into_table()?.into_handle(),
        })
    }

    /// Load a table from CSV text; the first record is the header.
    #[staticmethod]
    fn from_csv(id: &str, csv: &str) -> PyResult<Self> {
        Ok(PyTable {
            inner: RustTable::from_csv(id, csv)?.into_handle(),
        })
    }

    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        Ok(PyTable {
            inner: RustTable::from_json(json)?.into_handle(),
        })
    }

    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.borrow().to_source())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __len__(&self) -> usize {
        self.inner.borrow().row_count()
    }

    fn __repr__(&self) -> String {
        let table = self.inner.borrow();
        format!(
            "Table(id={:?}, rows={}, columns={}, visible={})",
            table.id().unwrap_or(""),
            table.row_count(),
            table.column_count(),
            table.visible_row_indices().len()
        )
    }

    #[getter]
    fn id(&self) -> Option<String> {
        self.inner.borrow().id().map(str::to_string)
    }

    fn column_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .header_cells()
            .unwrap_or(&[])
            .iter()
            .map(|c| c.text().to_string())
            .collect()
    }

    /// Trimmed text of a cell.
    fn cell(&self, row: usize, column: usize) -> PyResult<String> {
        let table = self.inner.borrow();
        if row >= table.row_count() {
            return Err(PyIndexError::new_err(format!("Row index {} out of range", row)));
        }
        Ok(table.cell_text(row, column).to_string())
    }

    /// Indices of the rows currently shown.
    fn visible_rows(&self) -> Vec<usize> {
        self.inner.borrow().visible_row_indices()
    }

    fn is_row_hidden(&self, row: usize) -> bool {
        self.inner.borrow().is_row_hidden(row)
    }

    fn header_attribute(&self, column: usize, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .header_cells()
            .and_then(|cells| cells.get(column))
            .and_then(|c| c.attribute(name))
            .map(str::to_string)
    }
}

// ============================================================================
// Frame
// ============================================================================

/// What an instance shows after an interaction.
#[pyclass(name = "Frame")]
#[derive(Clone)]
pub struct PyFrame {
    /// Source indices of the rows on the current page, in display order
    #[pyo3(get)]
    visible_rows: Vec<usize>,
    #[pyo3(get)]
    current_page: usize,
    #[pyo3(get)]
    total_pages: usize,
    #[pyo3(get)]
    page_size: usize,
    /// Rows matching the search
    #[pyo3(get)]
    matched_rows: usize,
    #[pyo3(get)]
    total_rows: usize,
    #[pyo3(get)]
    info: String,
    #[pyo3(get)]
    no_data: bool,
    /// Pager labels; the current page is wrapped in brackets
    #[pyo3(get)]
    buttons: Vec<String>,
    json: String,
}

impl PyFrame {
    fn from_frame(frame: &RenderFrame) -> PyResult<Self> {
        let json = serde_json::to_string(frame).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyFrame {
            visible_rows: frame.visible_rows.clone(),
            current_page: frame.window.current_page,
            total_pages: frame.window.total_pages,
            page_size: frame.window.page_size,
            matched_rows: frame.window.total_rows,
            total_rows: frame.total_rows,
            info: frame.info.clone(),
            no_data: frame.no_data,
            buttons: frame.window.buttons.iter().map(button_label).collect(),
            json,
        })
    }
}

fn button_label(button: &PageButton) -> String {
    if button.is_current() {
        format!("[{}]", button.label())
    } else {
        button.label()
    }
}

#[pymethods]
impl PyFrame {
    fn to_json(&self) -> String {
        self.json.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "Frame(page={}/{}, rows={:?}, info={:?})",
            self.current_page, self.total_pages, self.visible_rows, self.info
        )
    }
}

// ============================================================================
// Instance
// ============================================================================

/// An enhancer attached to one table.
///
/// After `destroy()` every method raises `RuntimeError`.
#[pyclass(name = "Instance", unsendable)]
pub struct PyInstance {
    inner: Option<TableInstance>,
}

impl PyInstance {
    fn live(&mut self) -> Result<&mut TableInstance, TableError> {
        self.inner.as_mut().ok_or(TableError::Destroyed)
    }

    fn live_ref(&self) -> Result<&TableInstance, TableError> {
        self.inner.as_ref().ok_or(TableError::Destroyed)
    }
}

#[pymethods]
impl PyInstance {
    fn on_search_changed(&mut self, term: &str) -> PyResult<PyFrame> {
        PyFrame::from_frame(&self.live()?.on_search_changed(term))
    }

    fn on_header_clicked(&mut self, column: usize) -> PyResult<PyFrame> {
        PyFrame::from_frame(&self.live()?.on_header_clicked(column))
    }

    fn on_page_size_changed(&mut self, page_size: usize) -> PyResult<PyFrame> {
        PyFrame::from_frame(&self.live()?.on_page_size_changed(page_size))
    }

    fn on_page_selected(&mut self, page: usize) -> PyResult<PyFrame> {
        PyFrame::from_frame(&self.live()?.on_page_selected(page))
    }

    fn refresh(&mut self) -> PyResult<PyFrame> {
        PyFrame::from_frame(&self.live()?.refresh())
    }

    /// Restore the table and release the instance.
    fn destroy(&mut self) -> PyResult<()> {
        let instance = self.inner.take().ok_or(TableError::Destroyed)?;
        instance.destroy();
        Ok(())
    }

    #[getter]
    fn is_destroyed(&self) -> bool {
        self.inner.is_none()
    }

    #[getter]
    fn search_term(&self) -> PyResult<String> {
        Ok(self.live_ref()?.state().search_term.clone())
    }

    /// Active sort as `(column, "asc" | "desc")`, or None.
    #[getter]
    fn sort(&self) -> PyResult<Option<(usize, String)>> {
        Ok(self
            .live_ref()?
            .state()
            .sort
            .map(|key| (key.column, key.order.as_str().to_string())))
    }

    #[getter]
    fn page_size(&self) -> PyResult<usize> {
        Ok(self.live_ref()?.state().page_size)
    }

    #[getter]
    fn current_page(&self) -> PyResult<usize> {
        Ok(self.live_ref()?.state().current_page)
    }

    #[getter]
    fn page_sizes(&self) -> PyResult<Vec<usize>> {
        Ok(self.live_ref()?.page_sizes().to_vec())
    }

    fn controls_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.live_ref()?.controls()).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        match &self.inner {
            Some(instance) => format!("Instance({:?})", instance),
            None => "Instance(destroyed)".to_string(),
        }
    }
}

/// Attach an enhancer to a table.
///
/// Args:
///     table: The table to enhance
///     per_page: Initial page size (default: first of per_page_options)
///     per_page_options: Selectable page sizes (default: [10, 25, 50, 100])
///     numeric_cols: Column indices to sort numerically
///     date_cols: Column indices to sort as dates
///     labels: Label overrides keyed by search, searchPlaceholder, rows, info, noData
///
/// Raises:
///     ValueError: if the table has no header row or no body
#[pyfunction]
#[pyo3(name = "enhance", signature = (table, per_page=None, per_page_options=None, numeric_cols=None, date_cols=None, labels=None))]
fn py_enhance(
    table: PyRef<'_, PyTable>,
    per_page: Option<usize>,
    per_page_options: Option<Vec<usize>>,
    numeric_cols: Option<Vec<usize>>,
    date_cols: Option<Vec<usize>>,
    labels: Option<HashMap<String, String>>,
) -> PyResult<PyInstance> {
    let mut options = Options::new()
        .with_per_page_options(per_page_options.unwrap_or_default())
        .with_numeric_cols(numeric_cols.unwrap_or_default())
        .with_date_cols(date_cols.unwrap_or_default());
    options.per_page = per_page;
    if let Some(labels) = labels {
        let value = serde_json::to_value(labels).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let labels: Labels = serde_json::from_value(value).map_err(|e| PyValueError::new_err(e.to_string()))?;
        options = options.with_labels(labels);
    }

    let name = table.inner.borrow().id().unwrap_or("").to_string();
    let instance = enhance_target(table.inner.clone(), &options)
        .pop()
        .ok_or(TableError::NotEnhanceable(name))?;
    Ok(PyInstance {
        inner: Some(instance),
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

#[pymodule]
fn table_enhancer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTable>()?;
    m.add_class::<PyFrame>()?;
    m.add_class::<PyInstance>()?;
    m.add_function(wrap_pyfunction!(py_enhance, m)?)?;
    Ok(())
}
