/// Instance lifecycle.
///
/// `enhance` attaches one independent `TableInstance` to every usable table
/// in a target. An instance owns its snapshot, typing and query state; the
/// only thing it shares is the host table it writes visibility and sort
/// markers to. Every interaction is a plain `&mut self` transition that
/// re-runs the pipeline and returns the new `RenderFrame`.
///
/// # Examples
///
/// ```
/// use table_enhancer::{enhance, BodyRow, HeaderCell, Options, Table};
///
/// let table = Table::new()
///     .with_header(vec![HeaderCell::new("Name"), HeaderCell::new("Score")])
///     .with_body(vec![
///         BodyRow::new(vec!["Alice", "5"]),
///         BodyRow::new(vec!["bob", "12"]),
///         BodyRow::new(vec!["Carol", "12"]),
///     ])
///     .into_handle();
///
/// let options = Options::new().with_numeric_cols(vec![1]);
/// let mut instances = enhance(table.clone(), &options);
/// let mut instance = instances.remove(0);
///
/// let frame = instance.on_header_clicked(1);
/// assert_eq!(frame.visible_rows, vec![0, 1, 2]);
/// let frame = instance.on_header_clicked(1);
/// assert_eq!(frame.visible_rows, vec![1, 2, 0]);
///
/// instance.on_search_changed("zzz");
/// assert!(table.borrow().visible_row_indices().is_empty());
///
/// instance.destroy();
/// assert_eq!(table.borrow().visible_row_indices(), vec![0, 1, 2]);
/// ```

use crate::column::ColumnTyping;
use crate::options::{Labels, Options};
use crate::pagination::paginate;
use crate::presenter::{Controls, Presenter, RenderFrame};
use crate::snapshot::RowSnapshot;
use crate::table::{Document, TableHandle};
use crate::view::{run_query, QueryState};
use log::{debug, trace};

/// Header attribute added to every header cell of an enhanced table.
pub const SORTABLE_MARKER: &str = "data-sortable";

/// Header attribute holding the direction of the active sort column.
pub const SORT_DIR_MARKER: &str = "data-sort-dir";

/// What to enhance.
pub enum Target<'a> {
    /// Every table in `document` matching the selector.
    Selector(&'a Document, &'a str),
    Collection(Vec<TableHandle>),
    Element(TableHandle),
}

impl Target<'_> {
    pub fn resolve(self) -> Vec<TableHandle> {
        match self {
            Target::Selector(document, selector) => document.query_selector_all(selector),
            Target::Collection(tables) => tables,
            Target::Element(table) => vec![table],
        }
    }
}

impl From<TableHandle> for Target<'_> {
    fn from(table: TableHandle) -> Self {
        Target::Element(table)
    }
}

impl From<Vec<TableHandle>> for Target<'_> {
    fn from(tables: Vec<TableHandle>) -> Self {
        Target::Collection(tables)
    }
}

impl From<&[TableHandle]> for Target<'_> {
    fn from(tables: &[TableHandle]) -> Self {
        Target::Collection(tables.to_vec())
    }
}

/// Attaches an instance to every table in `target` that has a header row
/// and a body. Other tables are skipped without error.
pub fn enhance<'a>(target: impl Into<Target<'a>>, options: &Options) -> Vec<TableInstance> {
    let tables = target.into().resolve();
    let total = tables.len();
    let instances: Vec<TableInstance> = tables
        .into_iter()
        .filter_map(|table| TableInstance::new(table, options))
        .collect();
    debug!("enhanced {} of {} matched tables", instances.len(), total);
    instances
}

/// One enhancement pipeline bound to a single host table.
pub struct TableInstance {
    table: TableHandle,
    typing: ColumnTyping,
    snapshot: RowSnapshot,
    state: QueryState,
    /// Filtered and sorted source indices.
    working: Vec<usize>,
    page_sizes: Vec<usize>,
    labels: Labels,
    columns: Vec<String>,
    presenter: Option<Box<dyn Presenter>>,
}

impl TableInstance {
    /// Builds an instance, or `None` when the table lacks a header row or
    /// a body. The table is rendered to its first page immediately.
    pub fn new(table: TableHandle, options: &Options) -> Option<Self> {
        let (typing, snapshot, columns) = {
            let mut t = table.borrow_mut();
            let Some(header) = t.header_cells() else {
                debug!("skipping table {:?}: no header row", t.id());
                return None;
            };
            if !t.has_body() {
                debug!("skipping table {:?}: no body", t.id());
                return None;
            }

            let typing = ColumnTyping::resolve(header, &options.numeric_cols, &options.date_cols);
            let columns: Vec<String> = header.iter().map(|c| c.text().to_string()).collect();
            let snapshot = RowSnapshot::capture(&t);

            for i in 0..columns.len() {
                if let Some(cell) = t.header_cell_mut(i) {
                    cell.set_attribute(SORTABLE_MARKER, "");
                }
            }
            debug!(
                "enhancing table {:?}: {} rows, {} columns",
                t.id(),
                snapshot.len(),
                columns.len()
            );
            (typing, snapshot, columns)
        };

        let mut instance = TableInstance {
            table,
            typing,
            snapshot,
            state: QueryState::new(options.initial_page_size()),
            working: Vec::new(),
            page_sizes: options.page_size_choices(),
            labels: options.labels.clone(),
            columns,
            presenter: None,
        };
        instance.apply();
        Some(instance)
    }

    /// Mounts a presenter and renders the current state to it.
    pub fn attach(&mut self, mut presenter: Box<dyn Presenter>) -> RenderFrame {
        if let Some(mut old) = self.presenter.take() {
            old.detach();
        }
        presenter.mount(&self.controls());
        self.presenter = Some(presenter);
        self.render()
    }

    /// Sets the search term and goes back to the first page.
    pub fn on_search_changed(&mut self, term: &str) -> RenderFrame {
        self.state.search_term = term.to_string();
        self.state.current_page = 1;
        self.apply()
    }

    /// Sorts by `column`, toggling direction when it is already active.
    ///
    /// Clicks outside the header are ignored.
    pub fn on_header_clicked(&mut self, column: usize) -> RenderFrame {
        if column >= self.columns.len() {
            debug!("ignoring click on column {} of {}", column, self.columns.len());
            return self.render();
        }

        self.state.click_header(column);
        self.update_sort_markers();
        self.apply()
    }

    /// Changes the page size and goes back to the first page. Zero selects
    /// the first configured size.
    pub fn on_page_size_changed(&mut self, page_size: usize) -> RenderFrame {
        self.state.page_size = if page_size == 0 {
            self.page_sizes[0]
        } else {
            page_size
        };
        self.state.current_page = 1;
        self.apply()
    }

    /// Moves to `page`, clamped into range. The working set is reused.
    pub fn on_page_selected(&mut self, page: usize) -> RenderFrame {
        self.state.current_page = page;
        self.render()
    }

    /// Re-runs filter, sort and pagination with the current state.
    pub fn refresh(&mut self) -> RenderFrame {
        self.apply()
    }

    /// Detaches the presenter and returns the table to how it was found:
    /// every row visible, no sort markers.
    pub fn destroy(mut self) {
        if let Some(mut presenter) = self.presenter.take() {
            presenter.detach();
        }

        let mut table = self.table.borrow_mut();
        table.show_all();
        for i in 0..self.columns.len() {
            if let Some(cell) = table.header_cell_mut(i) {
                cell.remove_attribute(SORTABLE_MARKER);
                cell.remove_attribute(SORT_DIR_MARKER);
            }
        }
        debug!("destroyed instance for table {:?}", table.id());
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn typing(&self) -> &ColumnTyping {
        &self.typing
    }

    pub fn snapshot(&self) -> &RowSnapshot {
        &self.snapshot
    }

    /// Filtered and sorted source indices across all pages.
    pub fn working_set(&self) -> &[usize] {
        &self.working
    }

    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    pub fn page_sizes(&self) -> &[usize] {
        &self.page_sizes
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn controls(&self) -> Controls {
        Controls {
            search_label: self.labels.search.clone(),
            search_placeholder: self.labels.search_placeholder.clone(),
            rows_label: self.labels.rows.clone(),
            page_sizes: self.page_sizes.clone(),
            page_size: self.state.page_size,
            columns: self.columns.clone(),
        }
    }

    fn update_sort_markers(&mut self) {
        let mut table = self.table.borrow_mut();
        for i in 0..self.columns.len() {
            if let Some(cell) = table.header_cell_mut(i) {
                cell.remove_attribute(SORT_DIR_MARKER);
            }
        }
        if let Some(key) = self.state.sort {
            if let Some(cell) = table.header_cell_mut(key.column) {
                cell.set_attribute(SORT_DIR_MARKER, key.order.as_str());
            }
        }
    }

    fn apply(&mut self) -> RenderFrame {
        self.working = run_query(&self.snapshot, &self.state, &self.typing);
        self.render()
    }

    fn render(&mut self) -> RenderFrame {
        let window = paginate(self.working.len(), self.state.page_size, self.state.current_page);
        self.state.current_page = window.current_page;

        let visible_rows = window
            .visible_range
            .clone()
            .map(|range| self.working[range].to_vec())
            .unwrap_or_default();
        self.table.borrow_mut().show_only(&visible_rows);

        let info = match window.row_span() {
            Some((start, end)) => self.labels.info.format(start, end, window.total_rows),
            None => self.labels.no_data.clone(),
        };

        let frame = RenderFrame {
            no_data: window.is_empty(),
            visible_rows,
            window,
            info,
            search_term: self.state.search_term.clone(),
            sort: self.state.sort,
            total_rows: self.snapshot.len(),
        };
        trace!(
            "render page {}/{}: {} of {} rows",
            frame.window.current_page,
            frame.window.total_pages,
            frame.visible_rows.len(),
            frame.window.total_rows
        );

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.render(&frame);
        }
        frame
    }
}

impl std::fmt::Debug for TableInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TableInstance {{ rows: {}, columns: {}, state: {:?} }}",
            self.snapshot.len(),
            self.columns.len(),
            self.state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TYPE_MARKER;
    use crate::pagination::PageButton;
    use crate::presenter::TextPresenter;
    use crate::table::{BodyRow, HeaderCell, Table};
    use crate::view::SortKey;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Presenter that records everything it is given.
    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        frames: Rc<RefCell<Vec<RenderFrame>>>,
    }

    impl Presenter for Recorder {
        fn mount(&mut self, controls: &Controls) {
            self.log.borrow_mut().push(format!("mount {:?}", controls.page_sizes));
        }

        fn render(&mut self, frame: &RenderFrame) {
            self.log.borrow_mut().push("render".to_string());
            self.frames.borrow_mut().push(frame.clone());
        }

        fn detach(&mut self) {
            self.log.borrow_mut().push("detach".to_string());
        }
    }

    fn numbered_table(rows: usize) -> TableHandle {
        Table::new()
            .with_header(vec![
                HeaderCell::new("Item"),
                HeaderCell::new("Qty").with_attribute(TYPE_MARKER, "number"),
            ])
            .with_body(
                (0..rows)
                    .map(|i| BodyRow::new(vec![format!("item {i}"), format!("{}", i % 7)]))
                    .collect(),
            )
            .into_handle()
    }

    fn single(table: TableHandle, options: &Options) -> TableInstance {
        let mut instances = enhance(table, options);
        assert_eq!(instances.len(), 1);
        instances.remove(0)
    }

    #[test]
    fn test_initial_render_shows_first_page() {
        let table = numbered_table(42);
        let instance = single(table.clone(), &Options::new());

        assert_eq!(table.borrow().visible_row_indices(), (0..10).collect::<Vec<_>>());
        assert_eq!(instance.state().current_page, 1);
        assert_eq!(instance.state().page_size, 10);
        assert_eq!(instance.working_set().len(), 42);
    }

    #[test]
    fn test_tables_without_header_or_body_are_skipped() {
        let mut doc = Document::new();
        doc.add_table(Table::new().with_id("no-head").with_body(vec![BodyRow::new(vec!["x"])]));
        doc.add_table(Table::new().with_id("no-body").with_header(vec![HeaderCell::new("A")]));
        doc.add_table(Table::new().with_id("empty-head").with_header(vec![]).with_body(vec![]));
        doc.add_table(
            Table::new()
                .with_id("ok")
                .with_header(vec![HeaderCell::new("A")])
                .with_body(vec![]),
        );

        let instances = enhance(Target::Selector(&doc, "table"), &Options::new());
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].table().borrow().id(), Some("ok"));

        let skipped = doc.query_selector_all("#no-head")[0].clone();
        assert!(!skipped.borrow().is_row_hidden(0));
    }

    #[test]
    fn test_selector_collection_and_element_targets() {
        let mut doc = Document::new();
        let a = doc.add_table(Table::from_csv("a", "n\n1\n2").unwrap().with_class("grid"));
        let b = doc.add_table(Table::from_csv("b", "n\n3").unwrap().with_class("grid"));
        doc.add_table(Table::from_csv("c", "n\n4").unwrap());

        assert_eq!(enhance(Target::Selector(&doc, ".grid"), &Options::new()).len(), 2);
        assert_eq!(enhance(vec![a.clone(), b], &Options::new()).len(), 2);
        assert_eq!(enhance(a, &Options::new()).len(), 1);
        assert!(enhance(Target::Selector(&doc, ".missing"), &Options::new()).is_empty());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut doc = Document::new();
        let a = doc.add_table(Table::from_csv("a", "n\nx\ny").unwrap());
        let b = doc.add_table(Table::from_csv("b", "n\nx\ny").unwrap());

        let mut instances = enhance(Target::Selector(&doc, "table"), &Options::new());
        instances[0].on_search_changed("y");

        assert_eq!(a.borrow().visible_row_indices(), vec![1]);
        assert_eq!(b.borrow().visible_row_indices(), vec![0, 1]);
        assert_eq!(instances[1].state().search_term, "");
    }

    #[test]
    fn test_search_resets_page_and_clamps() {
        let table = numbered_table(42);
        let mut instance = single(table.clone(), &Options::new());

        let frame = instance.on_page_selected(5);
        assert_eq!(frame.window.current_page, 5);
        assert_eq!(frame.visible_rows, vec![40, 41]);

        let frame = instance.on_search_changed("ITEM 1");
        // item 1, item 10..19
        assert_eq!(frame.window.current_page, 1);
        assert_eq!(frame.window.total_rows, 11);
        assert_eq!(frame.info, "Showing 1–10 of 11 entries");
        assert_eq!(table.borrow().visible_row_indices(), vec![1, 10, 11, 12, 13, 14, 15, 16, 17, 18]);
    }

    #[test]
    fn test_page_selection_is_clamped() {
        let mut instance = single(numbered_table(25), &Options::new());
        assert_eq!(instance.on_page_selected(99).window.current_page, 3);
        assert_eq!(instance.on_page_selected(0).window.current_page, 1);
        assert_eq!(instance.state().current_page, 1);
    }

    #[test]
    fn test_sort_keeps_page_but_clamps() {
        let mut instance = single(numbered_table(42), &Options::new());
        instance.on_page_selected(3);
        let frame = instance.on_header_clicked(1);
        assert_eq!(frame.window.current_page, 3);
        assert_eq!(frame.sort, Some(SortKey::ascending(1)));

        instance.on_page_size_changed(100);
        assert_eq!(instance.state().current_page, 1);
        let frame = instance.on_page_selected(2);
        assert_eq!(frame.window.current_page, 1);
    }

    #[test]
    fn test_filter_and_sort_survive_page_changes() {
        let table = numbered_table(42);
        let mut instance = single(table.clone(), &Options::new());
        instance.on_search_changed("item 1");
        instance.on_header_clicked(1);

        let frame = instance.on_page_size_changed(5);
        assert_eq!(frame.search_term, "item 1");
        assert_eq!(frame.sort, Some(SortKey::ascending(1)));
        assert_eq!(frame.window.total_rows, 11);
        assert_eq!(frame.window.total_pages, 3);

        let frame = instance.on_page_selected(2);
        assert_eq!(frame.search_term, "item 1");
        assert_eq!(frame.sort, Some(SortKey::ascending(1)));
        assert_eq!(frame.window.total_rows, 11);
        // qty is i % 7; equal quantities keep their filtered order
        assert_eq!(instance.working_set(), &[14, 1, 15, 16, 10, 17, 11, 18, 12, 19, 13]);
        assert_eq!(frame.visible_rows, instance.working_set()[5..10].to_vec());
        assert_eq!(frame.visible_rows, vec![17, 11, 18, 12, 19]);
        assert_eq!(table.borrow().visible_row_indices(), vec![11, 12, 17, 18, 19]);
    }

    #[test]
    fn test_sort_markers_follow_active_column() {
        let table = numbered_table(3);
        let mut instance = single(table.clone(), &Options::new());
        {
            let t = table.borrow();
            let header = t.header_cells().unwrap();
            assert!(header.iter().all(|c| c.has_attribute(SORTABLE_MARKER)));
            assert!(header.iter().all(|c| !c.has_attribute(SORT_DIR_MARKER)));
        }

        instance.on_header_clicked(1);
        instance.on_header_clicked(1);
        assert_eq!(table.borrow().header_cells().unwrap()[1].attribute(SORT_DIR_MARKER), Some("desc"));

        instance.on_header_clicked(0);
        let t = table.borrow();
        let header = t.header_cells().unwrap();
        assert_eq!(header[0].attribute(SORT_DIR_MARKER), Some("asc"));
        assert_eq!(header[1].attribute(SORT_DIR_MARKER), None);
    }

    #[test]
    fn test_click_outside_header_is_ignored() {
        let mut instance = single(numbered_table(3), &Options::new());
        let frame = instance.on_header_clicked(5);
        assert_eq!(frame.sort, None);
        assert_eq!(frame.visible_rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_page_size_uses_first_option() {
        let options = Options::new().with_per_page_options(vec![5, 50]).with_per_page(50);
        let mut instance = single(numbered_table(12), &options);
        assert_eq!(instance.state().page_size, 50);

        let frame = instance.on_page_size_changed(0);
        assert_eq!(frame.window.page_size, 5);
        assert_eq!(frame.window.total_pages, 3);
    }

    #[test]
    fn test_no_matches_signals_no_data() {
        let table = numbered_table(12);
        let mut instance = single(table.clone(), &Options::new());
        let frame = instance.on_search_changed("nothing like this");

        assert!(frame.no_data);
        assert!(frame.window.buttons.is_empty());
        assert_eq!(frame.window.total_pages, 1);
        assert_eq!(frame.info, "No data");
        assert!(table.borrow().visible_row_indices().is_empty());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut instance = single(numbered_table(30), &Options::new());
        instance.on_search_changed("2");
        instance.on_header_clicked(1);
        let first = instance.refresh();
        let second = instance.refresh();
        assert_eq!(first, second);
    }

    #[test]
    fn test_presenter_lifecycle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let frames = Rc::new(RefCell::new(Vec::new()));
        let table = numbered_table(15);
        let mut instance = single(table.clone(), &Options::new());

        instance.attach(Box::new(Recorder {
            log: log.clone(),
            frames: frames.clone(),
        }));
        instance.on_page_selected(2);
        instance.destroy();

        assert_eq!(*log.borrow(), vec!["mount [10, 25, 50, 100]", "render", "render", "detach"]);
        let frames = frames.borrow();
        assert_eq!(frames[1].visible_rows, (10..15).collect::<Vec<_>>());
        assert_eq!(frames[1].window.buttons[0], PageButton::Previous { target: 1, disabled: false });
    }

    #[test]
    fn test_attach_replaces_previous_presenter() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut instance = single(numbered_table(3), &Options::new());
        instance.attach(Box::new(Recorder {
            log: log.clone(),
            frames: Rc::default(),
        }));
        instance.attach(Box::new(TextPresenter::new()));
        assert_eq!(log.borrow().last().map(String::as_str), Some("detach"));
    }

    #[test]
    fn test_destroy_restores_table() {
        let table = numbered_table(42);
        let mut instance = single(table.clone(), &Options::new());
        instance.on_search_changed("item 3");
        instance.on_header_clicked(1);
        instance.on_page_selected(2);
        instance.destroy();

        let t = table.borrow();
        assert_eq!(t.visible_row_indices(), (0..42).collect::<Vec<_>>());
        for cell in t.header_cells().unwrap() {
            assert!(!cell.has_attribute(SORTABLE_MARKER));
            assert!(!cell.has_attribute(SORT_DIR_MARKER));
        }
        // author markers survive
        assert_eq!(t.header_cells().unwrap()[1].attribute(TYPE_MARKER), Some("number"));
    }
}
