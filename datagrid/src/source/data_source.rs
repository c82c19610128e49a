//! The grid data source: owns the rows and computes the rendered view.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, trace, warn};

use super::filter::{DEFAULT_CHILDREN_KEY, FilterSpec, default_filter_predicate};
use super::listeners::{Listener, Listeners, Subscription};
use super::paginator::{PageRequest, PaginatorState};
use super::sort::{SortState, SortValue, compare_keys, default_sort_accessor};
use crate::error::panic_message;
use crate::model::{RowData, RowId, RowStore, ViewRow};
use crate::pagination::{clamp_page_index, page_count};

/// Predicate deciding whether a row matches a normalized filter term.
pub type FilterPredicate<T> = Arc<dyn Fn(&T, &str) -> bool + Send + Sync>;

/// Accessor producing the comparable value of a row for a sort field.
pub type SortAccessor<T> = Arc<dyn Fn(&T, &str) -> SortValue + Send + Sync>;

/// Initial configuration of a [`GridDataSource`].
///
/// # Example
///
/// ```
/// use datagrid::source::{DataSourceConfig, SortState};
///
/// let config = DataSourceConfig::default()
///     .with_filter("contoso")
///     .with_sort(SortState::asc("name"))
///     .without_paginator();
/// ```
#[derive(Debug, Clone)]
pub struct DataSourceConfig {
    /// Initial filter.
    ///
    /// Default: none
    pub filter: Option<FilterSpec>,

    /// Initial sort.
    ///
    /// Default: none
    pub sort: SortState,

    /// Paginator, `None` to disable windowing.
    ///
    /// Default: enabled, page 0 of size 10, options [10, 50, 100]
    pub paginator: Option<PaginatorState>,

    /// Field holding child rows.
    ///
    /// Default: "children"
    pub children_key: String,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            filter: None,
            sort: SortState::none(),
            paginator: Some(PaginatorState::default()),
            children_key: DEFAULT_CHILDREN_KEY.to_string(),
        }
    }
}

impl DataSourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<FilterSpec>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<SortState>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn with_paginator(mut self, paginator: PaginatorState) -> Self {
        self.paginator = Some(paginator);
        self
    }

    pub fn without_paginator(mut self) -> Self {
        self.paginator = None;
        self
    }

    pub fn with_children_key(mut self, key: impl Into<String>) -> Self {
        self.children_key = key.into();
        self
    }
}

/// Owns a row collection and derives the filtered, sorted, paginated view.
///
/// Every setter recomputes the view synchronously (filter, then sort, then
/// paginate) and broadcasts it to all connected listeners before returning.
///
/// A data source may be shared by several listeners. There is no locking or
/// conflict detection between callers: the last write wins, and every
/// listener sees the result on the next broadcast.
///
/// # Example
///
/// ```
/// use datagrid::model::Record;
/// use datagrid::source::{DataSourceConfig, GridDataSource};
///
/// let rows = vec![
///     Record::new().set("name", "Contoso"),
///     Record::new().set("name", "Fabrikam"),
/// ];
/// let mut source = GridDataSource::new(rows, DataSourceConfig::default());
/// source.set_filter("fab");
/// assert_eq!(source.rendered().len(), 1);
/// ```
pub struct GridDataSource<T: RowData> {
    store: RowStore<T>,
    children_key: String,
    filter: Option<FilterSpec>,
    sort: SortState,
    paginator: PaginatorState,
    filter_predicate: FilterPredicate<T>,
    sort_accessor: SortAccessor<T>,
    /// Filtered and sorted rows, before windowing.
    filtered: Vec<ViewRow<T>>,
    rendered: Vec<ViewRow<T>>,
    listeners: Listeners<T>,
    generation: u64,
}

impl<T: RowData> GridDataSource<T> {
    /// Creates a data source and computes its initial view.
    pub fn new(rows: Vec<T>, config: DataSourceConfig) -> Self {
        let DataSourceConfig {
            filter,
            sort,
            paginator,
            mut children_key,
        } = config;

        if let Some(spec) = filter.as_ref().filter(|f| f.is_recursive()) {
            children_key = spec.children_key().to_string();
        }

        let mut source = Self {
            store: RowStore::ingest(rows, &children_key),
            children_key,
            filter,
            sort,
            paginator: paginator.unwrap_or_else(PaginatorState::disabled),
            filter_predicate: Arc::new(default_filter_predicate::<T>),
            sort_accessor: Arc::new(default_sort_accessor::<T>),
            filtered: Vec::new(),
            rendered: Vec::new(),
            listeners: Listeners::default(),
            generation: 0,
        };
        source.recompute();
        source
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replaces the row set. Row ids are reassigned.
    pub fn set_data(&mut self, rows: Vec<T>) {
        self.reingest(rows);
        debug!("Data replaced: {} rows (generation {})", self.length(), self.generation);
        self.recompute();
    }

    /// Returns the top-level rows as given, before filtering.
    pub fn data(&self) -> Vec<Arc<T>> {
        self.store
            .roots()
            .iter()
            .filter_map(|id| self.store.data(*id).cloned())
            .collect()
    }

    /// Looks up any ingested row (top-level or nested) by id.
    pub fn row(&self, id: RowId) -> Option<&Arc<T>> {
        self.store.data(id)
    }

    /// Increases every time the row set is replaced or re-ingested.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the field child rows are read from.
    pub fn children_key(&self) -> &str {
        &self.children_key
    }

    fn reingest(&mut self, rows: Vec<T>) {
        self.generation += 1;
        self.store = RowStore::ingest(rows, &self.children_key);
    }

    // =========================================================================
    // Filter
    // =========================================================================

    /// Sets the filter.
    ///
    /// A plain string sets a flat filter and leaves recursive mode. A
    /// recursive filter whose children key differs from the current one
    /// re-ingests the rows under the new key.
    pub fn set_filter(&mut self, filter: impl Into<FilterSpec>) {
        let filter = filter.into();
        if filter.is_recursive() && filter.children_key() != self.children_key {
            debug!(
                "Children key changed from '{}' to '{}'",
                self.children_key,
                filter.children_key()
            );
            self.children_key = filter.children_key().to_string();
            let rows = self.data().iter().map(|row| T::clone(row)).collect();
            self.reingest(rows);
        }
        debug!(
            "Filter set to '{}' (recursive: {})",
            filter.text(),
            filter.is_recursive()
        );
        self.filter = Some(filter);
        self.recompute();
    }

    /// Removes the filter.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.recompute();
    }

    /// Returns the current filter, if any.
    pub fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    /// Replaces the predicate used to match rows against the filter text.
    ///
    /// A predicate that panics on a row excludes that row.
    pub fn set_filter_predicate<F>(&mut self, predicate: F)
    where
        F: Fn(&T, &str) -> bool + Send + Sync + 'static,
    {
        self.filter_predicate = Arc::new(predicate);
        self.recompute();
    }

    // =========================================================================
    // Sort
    // =========================================================================

    /// Sets the sort keys. An empty state disables sorting.
    pub fn set_sort(&mut self, sort: impl Into<SortState>) {
        self.sort = sort.into();
        debug!("Sort set to {:?}", self.sort.keys());
        self.recompute();
    }

    /// Returns the current sort state.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Replaces the accessor that extracts comparable values for sorting.
    pub fn set_sort_accessor<F>(&mut self, accessor: F)
    where
        F: Fn(&T, &str) -> SortValue + Send + Sync + 'static,
    {
        self.sort_accessor = Arc::new(accessor);
        self.recompute();
    }

    // =========================================================================
    // Paginator
    // =========================================================================

    /// Moves the window, or disables windowing with `None`.
    ///
    /// A zero page size is ignored and the previous state kept. The page
    /// index is clamped into the page range for the new size.
    pub fn set_paginator(&mut self, request: Option<PageRequest>) {
        match request {
            None => {
                debug!("Paginator disabled");
                self.paginator.enabled = false;
            }
            Some(request) if request.page_size == 0 => {
                warn!("Ignoring paginator with invalid page size {}", request.page_size);
                return;
            }
            Some(request) => {
                let page_index =
                    clamp_page_index(request.page_index, self.filtered.len(), request.page_size);
                debug!("Paginator set to page {} of size {}", page_index, request.page_size);
                self.paginator.enabled = true;
                self.paginator.page_index = page_index;
                self.paginator.page_size = request.page_size;
            }
        }
        self.recompute();
    }

    /// Returns the current window, or `None` when windowing is disabled.
    pub fn paginator(&self) -> Option<PageRequest> {
        self.paginator
            .enabled
            .then(|| PageRequest::new(self.paginator.page_index, self.paginator.page_size))
    }

    /// Replaces the page sizes offered to the user.
    pub fn set_page_size_options(&mut self, options: Vec<usize>) {
        self.paginator.page_size_options = options.into_iter().filter(|o| *o > 0).collect();
    }

    pub fn page_index(&self) -> usize {
        self.paginator.page_index
    }

    pub fn page_size(&self) -> usize {
        self.paginator.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.paginator.page_size_options
    }

    pub fn paginator_enabled(&self) -> bool {
        self.paginator.enabled
    }

    /// Number of pages for the filtered rows at the current page size.
    pub fn page_count(&self) -> usize {
        page_count(self.filtered.len(), self.paginator.page_size)
    }

    // =========================================================================
    // Counts and view
    // =========================================================================

    /// Number of top-level rows before filtering.
    pub fn length(&self) -> usize {
        self.store.roots().len()
    }

    /// Number of top-level rows after filtering, before windowing.
    pub fn filtered_length(&self) -> usize {
        self.filtered.len()
    }

    /// The current rendered view.
    pub fn rendered(&self) -> &[ViewRow<T>] {
        &self.rendered
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers a listener and immediately calls it with the current view.
    pub fn connect<F>(&self, listener: F) -> Subscription<T>
    where
        F: Fn(&[ViewRow<T>]) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(listener);
        let subscription = self.listeners.subscribe(Arc::clone(&listener));
        listener(&self.rendered);
        subscription
    }

    /// Drops every listener.
    pub fn disconnect(&self) {
        self.listeners.clear();
    }

    /// Number of connected listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn recompute(&mut self) {
        let mut rows = self.apply_filter();
        trace!("Filter kept {} of {} rows", rows.len(), self.length());
        self.apply_sort(&mut rows);
        self.filtered = rows;
        self.paginator.page_index = clamp_page_index(
            self.paginator.page_index,
            self.filtered.len(),
            self.paginator.page_size,
        );
        self.rendered = self.apply_page();
        trace!("Rendered {} rows", self.rendered.len());
        self.listeners.broadcast(&self.rendered);
    }

    fn matches(&self, row: &T, term: &str) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.filter_predicate)(row, term))) {
            Ok(matched) => matched,
            Err(panic) => {
                warn!("Filter predicate panicked, excluding row: {}", panic_message(&panic));
                false
            }
        }
    }

    fn apply_filter(&self) -> Vec<ViewRow<T>> {
        let store = &self.store;
        let keep_all = vec![true; store.len()];

        let Some(filter) = self.filter.as_ref().filter(|f| !f.is_empty()) else {
            return store.build_view(store.roots(), &keep_all);
        };
        let term = filter.text();

        if !filter.is_recursive() {
            let roots: Vec<RowId> = store
                .roots()
                .iter()
                .copied()
                .filter(|id| store.data(*id).is_some_and(|row| self.matches(row, term)))
                .collect();
            return store.build_view(&roots, &keep_all);
        }

        // Children always have larger ids than their parent, so a reverse
        // walk sees every descendant before the node itself.
        let mut survives = vec![false; store.len()];
        for index in (0..store.len()).rev() {
            let id = RowId(index);
            let child_survives = store.children(id).iter().any(|c| survives[c.0]);
            survives[index] =
                child_survives || store.data(id).is_some_and(|row| self.matches(row, term));
        }
        let roots: Vec<RowId> = store
            .roots()
            .iter()
            .copied()
            .filter(|id| survives[id.0])
            .collect();
        store.build_view(&roots, &survives)
    }

    fn apply_sort(&self, rows: &mut Vec<ViewRow<T>>) {
        let keys = self.sort.keys();
        if keys.is_empty() {
            return;
        }

        let mut decorated: Vec<(Vec<SortValue>, ViewRow<T>)> = rows
            .drain(..)
            .map(|row| {
                let values = keys
                    .iter()
                    .map(|key| (self.sort_accessor)(row.data.as_ref(), key.active.as_str()))
                    .collect();
                (values, row)
            })
            .collect();
        // Stable: rows tying on every key keep their relative order.
        decorated.sort_by(|(a, _), (b, _)| compare_keys(keys, a, b));
        rows.extend(decorated.into_iter().map(|(_, row)| row));
    }

    fn apply_page(&self) -> Vec<ViewRow<T>> {
        if !self.paginator.enabled {
            return self.filtered.clone();
        }
        let start = self.paginator.page_index.saturating_mul(self.paginator.page_size);
        self.filtered
            .iter()
            .skip(start)
            .take(self.paginator.page_size)
            .cloned()
            .collect()
    }
}

impl<T: RowData + std::fmt::Debug> std::fmt::Debug for GridDataSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridDataSource")
            .field("length", &self.length())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("paginator", &self.paginator)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
