//! Paginator state held by the data source.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default page size choices offered to the user.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 3] = [10, 50, 100];

/// Windowing configuration of a data source.
///
/// # Example
///
/// ```
/// use datagrid::source::PaginatorState;
///
/// let state = PaginatorState::default().with_page_size(50).unwrap();
/// assert_eq!(state.page_size, 50);
/// assert!(PaginatorState::default().with_page_size(0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorState {
    /// Whether the view is windowed at all.
    ///
    /// Default: true
    pub enabled: bool,

    /// Zero-based index of the current page.
    ///
    /// Default: 0
    pub page_index: usize,

    /// Rows per page, always greater than zero.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Page sizes offered to the user.
    ///
    /// Default: [10, 50, 100]
    pub page_size_options: Vec<usize>,
}

impl Default for PaginatorState {
    fn default() -> Self {
        Self {
            enabled: true,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl PaginatorState {
    /// Creates an enabled paginator with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled paginator; the view is the full filtered set.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the page index.
    pub fn with_page_index(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// Sets the page size, rejecting zero.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(GridError::invalid_page_size(page_size));
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Sets the offered page sizes.
    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }
}

/// A page position requested by a host or the pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}
