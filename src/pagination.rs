/// Pagination controller.
///
/// Slices a working set into pages, keeps the current page in range and
/// lays out the pager: previous/next controls around a sliding window of
/// page buttons, with the first and last page always reachable.

use serde::Serialize;
use std::ops::Range;

/// Number of consecutive page buttons shown around the current page.
pub const WINDOW_SIZE: usize = 5;

/// One element of the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageButton {
    Previous { target: usize, disabled: bool },
    Page { number: usize, current: bool },
    Ellipsis,
    Next { target: usize, disabled: bool },
}

impl PageButton {
    pub fn label(&self) -> String {
        match self {
            PageButton::Previous { .. } => "‹".to_string(),
            PageButton::Page { number, .. } => number.to_string(),
            PageButton::Ellipsis => "…".to_string(),
            PageButton::Next { .. } => "›".to_string(),
        }
    }

    /// Page the button navigates to; `None` for ellipsis markers.
    pub fn target(&self) -> Option<usize> {
        match *self {
            PageButton::Previous { target, .. } | PageButton::Next { target, .. } => Some(target),
            PageButton::Page { number, .. } => Some(number),
            PageButton::Ellipsis => None,
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, PageButton::Page { current: true, .. })
    }

    pub fn is_disabled(&self) -> bool {
        matches!(
            self,
            PageButton::Previous { disabled: true, .. } | PageButton::Next { disabled: true, .. }
        )
    }

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, PageButton::Ellipsis)
    }
}

/// Pagination result for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    /// Rows in the working set.
    pub total_rows: usize,
    pub buttons: Vec<PageButton>,
    /// Positions in the working set shown on this page; `None` when there
    /// is nothing to show.
    pub visible_range: Option<Range<usize>>,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.visible_range.is_none()
    }

    /// 1-based first and last row numbers shown, for info lines.
    pub fn row_span(&self) -> Option<(usize, usize)> {
        self.visible_range.as_ref().map(|r| (r.start + 1, r.end))
    }
}

/// `max(1, ceil(count / page_size))`; a zero page size counts as one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Paginates `count` rows. `requested_page` is clamped into range; the
/// clamped value is reported back as `current_page`.
///
/// # Examples
///
/// ```
/// use table_enhancer::pagination::{paginate, PageButton};
///
/// let window = paginate(95, 10, 1);
/// assert_eq!(window.total_pages, 10);
/// assert_eq!(window.visible_range, Some(0..10));
///
/// let labels: Vec<String> = window.buttons.iter().map(PageButton::label).collect();
/// assert_eq!(labels, ["‹", "1", "2", "3", "4", "5", "…", "10", "›"]);
///
/// let empty = paginate(0, 10, 3);
/// assert!(empty.is_empty());
/// assert!(empty.buttons.is_empty());
/// assert_eq!(empty.current_page, 1);
/// ```
pub fn paginate(count: usize, page_size: usize, requested_page: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_pages(count, page_size);
    let current_page = clamp_page(requested_page, total_pages);

    let (buttons, visible_range) = if count == 0 {
        (Vec::new(), None)
    } else {
        let start = (current_page - 1) * page_size;
        let end = count.min(current_page * page_size);
        (page_buttons(current_page, total_pages, WINDOW_SIZE), Some(start..end))
    };

    PageWindow {
        total_pages,
        current_page,
        page_size,
        total_rows: count,
        buttons,
        visible_range,
    }
}

/// Lays out the pager for `current` out of `total` pages.
pub fn page_buttons(current: usize, total: usize, window_size: usize) -> Vec<PageButton> {
    let total = total.max(1);
    let current = clamp_page(current, total);
    let window_size = window_size.max(1);

    let start = current.saturating_sub(window_size / 2).max(1);
    let end = total.min(start + window_size - 1);
    let start = start.min((end + 1).saturating_sub(window_size)).max(1);

    let mut buttons = Vec::with_capacity(window_size + 6);
    buttons.push(PageButton::Previous {
        target: current.saturating_sub(1).max(1),
        disabled: current == 1,
    });

    if start > 1 {
        buttons.push(PageButton::Page {
            number: 1,
            current: current == 1,
        });
        if start > 2 {
            buttons.push(PageButton::Ellipsis);
        }
    }

    for number in start..=end {
        buttons.push(PageButton::Page {
            number,
            current: number == current,
        });
    }

    if end < total {
        if end < total - 1 {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(PageButton::Page {
            number: total,
            current: current == total,
        });
    }

    buttons.push(PageButton::Next {
        target: (current + 1).min(total),
        disabled: current == total,
    });

    buttons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(buttons: &[PageButton]) -> Vec<String> {
        buttons.iter().map(PageButton::label).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_first_page_of_ten() {
        let buttons = page_buttons(1, 10, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "2", "3", "4", "5", "…", "10", "›"]);
        assert_eq!(buttons[0], PageButton::Previous { target: 1, disabled: true });
        assert!(buttons[1].is_current());
        assert_eq!(buttons.iter().filter(|b| b.is_current()).count(), 1);
        assert_eq!(buttons[8], PageButton::Next { target: 2, disabled: false });
    }

    #[test]
    fn test_middle_page_has_both_ellipses() {
        let buttons = page_buttons(6, 10, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "…", "4", "5", "6", "7", "8", "…", "10", "›"]);
        assert_eq!(buttons[0].target(), Some(5));
        assert_eq!(buttons[10].target(), Some(7));
        assert!(buttons[5].is_current());
    }

    #[test]
    fn test_window_slides_back_at_the_end() {
        let buttons = page_buttons(10, 10, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "…", "6", "7", "8", "9", "10", "›"]);
        assert!(buttons[8].is_disabled());
        assert_eq!(buttons[8].target(), Some(10));
    }

    #[test]
    fn test_no_ellipsis_next_to_edges() {
        let buttons = page_buttons(4, 10, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "2", "3", "4", "5", "6", "…", "10", "›"]);

        let buttons = page_buttons(4, 6, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "2", "3", "4", "5", "6", "›"]);

        let buttons = page_buttons(3, 7, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "2", "3", "4", "5", "…", "7", "›"]);

        let buttons = page_buttons(3, 6, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "2", "3", "4", "5", "6", "›"]);
    }

    #[test]
    fn test_few_pages() {
        let buttons = page_buttons(1, 1, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "›"]);
        assert!(buttons[0].is_disabled());
        assert!(buttons[2].is_disabled());

        let buttons = page_buttons(3, 3, WINDOW_SIZE);
        assert_eq!(labels(&buttons), ["‹", "1", "2", "3", "›"]);
    }

    #[test]
    fn test_ellipsis_has_no_target() {
        assert_eq!(PageButton::Ellipsis.target(), None);
        assert!(PageButton::Ellipsis.is_ellipsis());
        assert!(!PageButton::Ellipsis.is_disabled());
    }

    #[test]
    fn test_paginate_clamps_and_slices() {
        let window = paginate(23, 10, 7);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.current_page, 3);
        assert_eq!(window.visible_range, Some(20..23));
        assert_eq!(window.row_span(), Some((21, 23)));

        let window = paginate(23, 10, 0);
        assert_eq!(window.current_page, 1);
        assert_eq!(window.visible_range, Some(0..10));
    }

    #[test]
    fn test_paginate_empty_signals_no_data() {
        let window = paginate(0, 25, 1);
        assert_eq!(window.total_pages, 1);
        assert!(window.is_empty());
        assert!(window.buttons.is_empty());
        assert_eq!(window.row_span(), None);
    }

    #[test]
    fn test_serialized_buttons_are_tagged() {
        let json = serde_json::to_value(page_buttons(1, 2, WINDOW_SIZE)).unwrap();
        assert_eq!(json[0]["kind"], "previous");
        assert_eq!(json[1]["kind"], "page");
        assert_eq!(json[1]["current"], true);
        assert_eq!(json[3]["kind"], "next");
    }
}
