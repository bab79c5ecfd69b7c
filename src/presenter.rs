/// Presentation boundary.
///
/// The engine hands a `RenderFrame` to whatever draws the controls. A
/// presenter is mounted once with the static `Controls`, receives a frame
/// after every state transition, and is detached on `destroy`.

use crate::pagination::{PageButton, PageWindow};
use crate::view::SortKey;
use serde::Serialize;

/// Static control setup: labels, page-size choices and column titles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    pub search_label: String,
    pub search_placeholder: String,
    pub rows_label: String,
    pub page_sizes: Vec<usize>,
    pub page_size: usize,
    pub columns: Vec<String>,
}

/// Everything a presenter needs to draw one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// Source indices of the rows on the current page, in display order.
    pub visible_rows: Vec<usize>,
    pub window: PageWindow,
    /// Info line, or the no-data label when nothing matches.
    pub info: String,
    pub no_data: bool,
    pub search_term: String,
    pub sort: Option<SortKey>,
    /// Rows in the table, before filtering.
    pub total_rows: usize,
}

/// Draws controls for one instance.
pub trait Presenter {
    fn mount(&mut self, controls: &Controls) {
        let _ = controls;
    }

    fn render(&mut self, frame: &RenderFrame);

    fn detach(&mut self) {}
}

/// Presenter that renders the control bar as one line of text.
///
/// ```text
/// Search: [Search…] | Rows: [10] 25 50 100 | Showing 1–10 of 42 entries | ‹ [1] 2 3 4 5 ›
/// ```
#[derive(Debug, Default)]
pub struct TextPresenter {
    controls: Option<Controls>,
    output: String,
    renders: usize,
}

impl TextPresenter {
    pub fn new() -> Self {
        TextPresenter::default()
    }

    /// The last rendered line; empty before the first render and after
    /// detaching.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn is_mounted(&self) -> bool {
        self.controls.is_some()
    }

    fn format_pager(buttons: &[PageButton]) -> String {
        buttons
            .iter()
            .map(|b| {
                if b.is_current() {
                    format!("[{}]", b.label())
                } else {
                    b.label()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Presenter for TextPresenter {
    fn mount(&mut self, controls: &Controls) {
        self.controls = Some(controls.clone());
    }

    fn render(&mut self, frame: &RenderFrame) {
        let Some(controls) = &self.controls else {
            return;
        };

        let search = if frame.search_term.is_empty() {
            controls.search_placeholder.as_str()
        } else {
            frame.search_term.as_str()
        };
        let sizes = controls
            .page_sizes
            .iter()
            .map(|&n| {
                if n == frame.window.page_size {
                    format!("[{n}]")
                } else {
                    n.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut parts = vec![
            format!("{}: [{}]", controls.search_label, search),
            format!("{}: {}", controls.rows_label, sizes),
            frame.info.clone(),
        ];
        if !frame.window.buttons.is_empty() {
            parts.push(Self::format_pager(&frame.window.buttons));
        }

        self.output = parts.join(" | ");
        self.renders += 1;
    }

    fn detach(&mut self) {
        self.controls = None;
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::paginate;

    fn controls() -> Controls {
        Controls {
            search_label: "Search".to_string(),
            search_placeholder: "Search…".to_string(),
            rows_label: "Rows".to_string(),
            page_sizes: vec![10, 25],
            page_size: 10,
            columns: vec!["Name".to_string()],
        }
    }

    fn frame(count: usize, page: usize) -> RenderFrame {
        let window = paginate(count, 10, page);
        RenderFrame {
            visible_rows: window.visible_range.clone().map(|r| r.collect()).unwrap_or_default(),
            no_data: window.is_empty(),
            info: if window.is_empty() { "No data".to_string() } else { "info".to_string() },
            window,
            search_term: String::new(),
            sort: None,
            total_rows: count,
        }
    }

    #[test]
    fn test_renders_nothing_until_mounted() {
        let mut presenter = TextPresenter::new();
        presenter.render(&frame(5, 1));
        assert_eq!(presenter.output(), "");
        assert_eq!(presenter.render_count(), 0);
    }

    #[test]
    fn test_renders_control_bar() {
        let mut presenter = TextPresenter::new();
        presenter.mount(&controls());
        presenter.render(&frame(35, 2));
        assert_eq!(
            presenter.output(),
            "Search: [Search…] | Rows: [10] 25 | info | ‹ 1 [2] 3 4 ›"
        );
    }

    #[test]
    fn test_no_data_has_no_pager() {
        let mut presenter = TextPresenter::new();
        presenter.mount(&controls());
        presenter.render(&frame(0, 1));
        assert_eq!(presenter.output(), "Search: [Search…] | Rows: [10] 25 | No data");
    }

    #[test]
    fn test_detach_clears_output() {
        let mut presenter = TextPresenter::new();
        presenter.mount(&controls());
        presenter.render(&frame(3, 1));
        presenter.detach();
        assert!(!presenter.is_mounted());
        assert_eq!(presenter.output(), "");
    }
}
