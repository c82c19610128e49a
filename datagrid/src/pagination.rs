//! Page arithmetic and the page list shown by pagination controls.

use log::debug;
use serde::{Deserialize, Serialize};

/// Number of page entries shown before the list collapses with ellipses.
pub const MAX_VISIBLE_PAGES: usize = 6;

/// Number of pages for `length` rows, never less than one.
pub fn page_count(length: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    length.div_ceil(page_size).max(1)
}

/// Clamps a page index into `[0, page_count - 1]`.
pub fn clamp_page_index(page_index: usize, length: usize, page_size: usize) -> usize {
    page_index.min(page_count(length, page_size) - 1)
}

/// Page index that keeps the first visible row on screen after a resize.
pub fn resize_page_index(
    page_index: usize,
    old_page_size: usize,
    new_page_size: usize,
    length: usize,
) -> usize {
    if new_page_size == 0 {
        return page_index;
    }
    let first_item = page_index.saturating_mul(old_page_size);
    clamp_page_index(first_item / new_page_size, length, new_page_size)
}

/// An entry in the page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageItem {
    /// A one-based page number.
    Page(usize),
    /// A gap of hidden pages.
    Ellipsis,
}

impl std::fmt::Display for PageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("…"),
        }
    }
}

/// Builds the page list for the controls.
///
/// Up to [`MAX_VISIBLE_PAGES`] pages are listed in full. Beyond that the list
/// keeps the first and last page and a window around the current one.
pub fn page_items(page_count: usize, page_index: usize) -> Vec<PageItem> {
    if page_count <= MAX_VISIBLE_PAGES {
        return (1..=page_count).map(PageItem::Page).collect();
    }

    let current = page_index + 1;
    let mut items = Vec::with_capacity(MAX_VISIBLE_PAGES + 3);

    if current <= 4 {
        items.extend((1..=5).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(page_count));
    } else if current >= page_count - 3 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((page_count - 4..=page_count).map(PageItem::Page));
    } else {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((current - 2..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(page_count));
    }
    items
}

/// Emitted whenever the page position or size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEvent {
    pub page_index: usize,
    pub page_size: usize,
}

/// Pagination controls over a row count.
///
/// Every transition clamps the page index with the resulting page size and
/// returns the new position as a [`PageEvent`].
///
/// # Example
///
/// ```
/// use datagrid::pagination::Pagination;
///
/// let mut pagination = Pagination::new(12, 1, 5);
/// let event = pagination.set_page_size(10);
/// assert_eq!(event.page_index, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    length: usize,
    page_index: usize,
    page_size: usize,
}

impl Pagination {
    /// Creates controls for `length` rows. A zero page size is treated as one.
    pub fn new(length: usize, page_index: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            length,
            page_index: clamp_page_index(page_index, length, page_size),
            page_size,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        page_count(self.length, self.page_size)
    }

    /// The page list for the current position.
    pub fn items(&self) -> Vec<PageItem> {
        page_items(self.page_count(), self.page_index)
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    /// Human readable range, e.g. `"11 - 20 of 42"`.
    pub fn range_label(&self) -> String {
        if self.length == 0 {
            return "0 of 0".to_string();
        }
        let start = self.page_index * self.page_size;
        let end = (start + self.page_size).min(self.length);
        format!("{} - {} of {}", start + 1, end, self.length)
    }

    pub fn go_to(&mut self, page_index: usize) -> PageEvent {
        self.page_index = clamp_page_index(page_index, self.length, self.page_size);
        self.event()
    }

    pub fn first_page(&mut self) -> PageEvent {
        self.go_to(0)
    }

    pub fn previous_page(&mut self) -> PageEvent {
        self.go_to(self.page_index.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> PageEvent {
        self.go_to(self.page_index + 1)
    }

    pub fn last_page(&mut self) -> PageEvent {
        self.go_to(self.page_count() - 1)
    }

    /// Changes the page size, keeping the first visible row on screen.
    ///
    /// A zero size is ignored.
    pub fn set_page_size(&mut self, page_size: usize) -> PageEvent {
        if page_size == 0 {
            return self.event();
        }
        let page_index = resize_page_index(self.page_index, self.page_size, page_size, self.length);
        debug!(
            "Page size {} -> {}: page {} -> {}",
            self.page_size, page_size, self.page_index, page_index
        );
        self.page_size = page_size;
        self.page_index = page_index;
        self.event()
    }

    fn event(&self) -> PageEvent {
        PageEvent {
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}
