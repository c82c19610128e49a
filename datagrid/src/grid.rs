//! Grid orchestration: one data source, its tree, selection, columns and paging.
//!
//! [`Grid`] keeps the derived state (tree metadata, selection, detail-row
//! expansion) consistent with the data source and queues the events a host
//! reacts to. Hosts drain them with [`Grid::take_events`].

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::error::{GridError, Result};
use crate::layout::{ColumnLayout, ColumnLayoutEngine, ColumnSpec, LayoutConfig};
use crate::model::{RowData, RowId};
use crate::pagination::{PageEvent, PageItem, Pagination};
use crate::selection::{SelectionChange, SelectionController, SelectionMode};
use crate::source::{
    DataSourceConfig, FilterSpec, GridDataSource, PageRequest, SortDirection, SortState,
    Subscription,
};
use crate::tree::{Hierarchy, TreeModel, VisibleRow};

/// Tree mode settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeConfig {
    /// Rows with a level below this start expanded; `None` starts collapsed.
    pub initial_expand_level: Option<usize>,
}

impl TreeConfig {
    pub fn new(initial_expand_level: Option<usize>) -> Self {
        Self {
            initial_expand_level,
        }
    }
}

/// Grid configuration.
///
/// # Example
///
/// ```
/// use datagrid::grid::{GridConfig, TreeConfig};
/// use datagrid::selection::SelectionMode;
///
/// let config = GridConfig::default()
///     .with_selection(SelectionMode::Multiple)
///     .with_tree(TreeConfig::new(Some(1)))
///     .with_row_numbers();
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridConfig {
    /// Default: no selection
    pub selection_mode: SelectionMode,

    /// Tree mode, `None` for a flat grid.
    pub tree: Option<TreeConfig>,

    /// Show the row-number lane.
    pub show_row_number: bool,

    /// Flat rows can expand a detail area.
    pub expandable_rows: bool,

    pub data_source: DataSourceConfig,

    /// Widths and lanes. The lanes are filled in from the options above.
    pub layout: LayoutConfig,
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn with_row_numbers(mut self) -> Self {
        self.show_row_number = true;
        self
    }

    pub fn with_expandable_rows(mut self) -> Self {
        self.expandable_rows = true;
        self
    }

    pub fn with_data_source(mut self, config: DataSourceConfig) -> Self {
        self.data_source = config;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    fn resolved_layout(&self) -> LayoutConfig {
        let mut layout = self.layout.clone().with_tree_mode(self.tree.is_some());
        if self.show_row_number && layout.row_number_lane.is_none() {
            layout = layout.with_row_number_lane();
        }
        if self.selection_mode != SelectionMode::None && layout.selection_lane.is_none() {
            layout = layout.with_selection_lane();
        }
        if (self.expandable_rows || self.tree.is_some()) && layout.expand_lane.is_none() {
            layout = layout.with_expand_lane();
        }
        layout
    }
}

/// Events queued for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    SelectionChange(SelectionChange),
    RowExpandChange { row: RowId, expanded: bool },
    /// All expanded rows after an expansion change.
    ExpandedRowsChange(Vec<RowId>),
    PageChange(PageEvent),
    SortChange(SortState),
}

/// A data grid over rows of type `T`.
///
/// # Example
///
/// ```
/// use datagrid::grid::{Grid, GridConfig};
/// use datagrid::layout::ColumnSpec;
/// use datagrid::model::Record;
///
/// let rows = vec![
///     Record::new().set("name", "Fabrikam"),
///     Record::new().set("name", "Contoso"),
/// ];
/// let columns = vec![ColumnSpec::new("name", "Name").sortable()];
/// let mut grid = Grid::new(rows, columns, GridConfig::default());
///
/// grid.toggle_sort(0, false).unwrap();
/// let names: Vec<_> = grid
///     .visible_rows()
///     .iter()
///     .filter_map(|row| row.data.get_str("name").map(str::to_string))
///     .collect();
/// assert_eq!(names, ["Contoso", "Fabrikam"]);
/// ```
pub struct Grid<T: RowData> {
    source: GridDataSource<T>,
    columns: ColumnLayoutEngine,
    selection: SelectionController,
    tree_config: Option<TreeConfig>,
    tree: Option<TreeModel<T>>,
    expandable_rows: bool,
    /// Flat mode detail rows that are open.
    expanded_details: HashSet<RowId>,
    events: Vec<GridEvent>,
    dirty: Arc<AtomicBool>,
    generation: u64,
    page_index: usize,
    _subscription: Subscription<T>,
}

impl<T: RowData> Grid<T> {
    pub fn new(rows: Vec<T>, columns: Vec<ColumnSpec>, config: GridConfig) -> Self {
        let layout = config.resolved_layout();
        let GridConfig {
            selection_mode,
            tree,
            expandable_rows,
            data_source,
            ..
        } = config;

        let source = GridDataSource::new(rows, data_source);
        let dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dirty);
        let subscription = source.connect(move |_| flag.store(true, Ordering::Release));

        let mut grid = Self {
            generation: source.generation(),
            page_index: source.page_index(),
            source,
            columns: ColumnLayoutEngine::new(columns, layout),
            selection: SelectionController::new(selection_mode),
            tree_config: tree,
            tree: None,
            expandable_rows,
            expanded_details: HashSet::new(),
            events: Vec::new(),
            dirty,
            _subscription: subscription,
        };
        grid.rebuild_tree();
        grid.dirty.store(false, Ordering::Release);
        grid
    }

    // =========================================================================
    // Data source access
    // =========================================================================

    pub fn source(&self) -> &GridDataSource<T> {
        &self.source
    }

    /// Mutable access to the data source. Derived state is brought up to date
    /// when the guard is dropped.
    pub fn source_mut(&mut self) -> SourceGuard<'_, T> {
        SourceGuard { grid: self }
    }

    pub fn set_data(&mut self, rows: Vec<T>) {
        self.source.set_data(rows);
        self.sync();
    }

    pub fn set_filter(&mut self, filter: impl Into<FilterSpec>) {
        self.source.set_filter(filter);
        self.sync();
    }

    pub fn clear_filter(&mut self) {
        self.source.clear_filter();
        self.sync();
    }

    /// Looks up a row of the current row set.
    pub fn row(&self, id: RowId) -> Result<&Arc<T>> {
        self.source.row(id).ok_or(GridError::UnknownRow { id })
    }

    /// Brings tree metadata, selection and paging in line with the data
    /// source after it broadcast a new view.
    fn sync(&mut self) {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return;
        }

        let generation = self.source.generation();
        if generation != self.generation {
            debug!("Row set changed (generation {} -> {})", self.generation, generation);
            self.generation = generation;
            self.expanded_details.clear();
            self.tree = None;
            if let Some(change) = self.selection.clear() {
                self.events.push(GridEvent::SelectionChange(change));
            }
        }
        self.rebuild_tree();

        let page_index = self.source.page_index();
        if page_index != self.page_index {
            self.page_index = page_index;
            self.events.push(GridEvent::PageChange(self.page_event()));
        }
    }

    fn rebuild_tree(&mut self) {
        let Some(config) = self.tree_config else {
            return;
        };
        let mut tree = TreeModel::build(self.source.rendered(), config.initial_expand_level);
        if let Some(previous) = &self.tree {
            tree.carry_expansion(previous);
        }
        self.tree = Some(tree);
    }

    // =========================================================================
    // Columns and sort
    // =========================================================================

    pub fn columns(&self) -> &ColumnLayoutEngine {
        &self.columns
    }

    /// Replaces the columns. Manual widths are discarded.
    pub fn set_columns(&mut self, columns: Vec<ColumnSpec>) {
        self.columns.set_columns(columns);
    }

    pub fn column_layouts(&self) -> &[ColumnLayout] {
        self.columns.layouts()
    }

    /// Resizes a column. Returns `Ok(false)` if the column is not resizable.
    pub fn resize_column(&mut self, index: usize, width: f32) -> Result<bool> {
        let id = self.columns.column_id(index)?;
        Ok(self.columns.resize(id, width))
    }

    pub fn reset_column_width(&mut self, index: usize) -> Result<bool> {
        let id = self.columns.column_id(index)?;
        Ok(self.columns.reset_width(id))
    }

    /// Handles a click on a column header.
    ///
    /// Cycles the column's sort `none -> asc -> desc -> none`; with `multi`
    /// the other sort keys are kept. Custom and non-sortable columns ignore
    /// clicks and return `Ok(false)`.
    pub fn toggle_sort(&mut self, index: usize, multi: bool) -> Result<bool> {
        let spec = self
            .columns
            .spec(index)
            .ok_or_else(|| GridError::unknown_column(index, self.columns.len()))?;
        let Some(field) = spec.sort_field().map(str::to_string) else {
            return Ok(false);
        };

        let mut sort = self.source.sort().clone();
        sort.cycle(&field, multi);
        self.set_sort(sort);
        Ok(true)
    }

    pub fn set_sort(&mut self, sort: impl Into<SortState>) {
        self.source.set_sort(sort);
        self.events
            .push(GridEvent::SortChange(self.source.sort().clone()));
        self.sync();
    }

    /// Sort direction shown on a column header.
    pub fn sort_direction(&self, index: usize) -> Option<SortDirection> {
        let field = self.columns.spec(index)?.field.as_deref()?;
        self.source.sort().direction_of(field)
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Pagination controls for the current view.
    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            self.source.filtered_length(),
            self.source.page_index(),
            self.source.page_size(),
        )
    }

    pub fn page_items(&self) -> Vec<PageItem> {
        self.pagination().items()
    }

    pub fn go_to_page(&mut self, page_index: usize) -> Option<PageEvent> {
        self.page(|p| p.go_to(page_index))
    }

    pub fn first_page(&mut self) -> Option<PageEvent> {
        self.page(Pagination::first_page)
    }

    pub fn previous_page(&mut self) -> Option<PageEvent> {
        self.page(Pagination::previous_page)
    }

    pub fn next_page(&mut self) -> Option<PageEvent> {
        self.page(Pagination::next_page)
    }

    pub fn last_page(&mut self) -> Option<PageEvent> {
        self.page(Pagination::last_page)
    }

    /// Changes the page size, keeping the first visible row on screen.
    ///
    /// A zero size is ignored.
    pub fn set_page_size(&mut self, page_size: usize) -> Option<PageEvent> {
        if page_size == 0 {
            warn!("{}", GridError::invalid_page_size(page_size));
            return None;
        }
        self.page(|p| p.set_page_size(page_size))
    }

    /// Applies a paging transition. `None` while windowing is disabled.
    fn page(&mut self, transition: impl FnOnce(&mut Pagination) -> PageEvent) -> Option<PageEvent> {
        if !self.source.paginator_enabled() {
            return None;
        }
        let mut pagination = self.pagination();
        let event = transition(&mut pagination);
        self.source
            .set_paginator(Some(PageRequest::new(event.page_index, event.page_size)));
        self.page_index = self.source.page_index();
        self.events.push(GridEvent::PageChange(event));
        self.sync();
        Some(event)
    }

    fn page_event(&self) -> PageEvent {
        PageEvent {
            page_index: self.source.page_index(),
            page_size: self.source.page_size(),
        }
    }

    // =========================================================================
    // Visible rows and expansion
    // =========================================================================

    pub fn is_tree(&self) -> bool {
        self.tree_config.is_some()
    }

    pub fn tree(&self) -> Option<&TreeModel<T>> {
        self.tree.as_ref()
    }

    /// Rows to display, in order.
    ///
    /// In tree mode this is the flattened tree; in flat mode the rendered page,
    /// with `expanded` reporting whether the row's detail area is open.
    pub fn visible_rows(&self) -> Vec<VisibleRow<T>> {
        if let Some(tree) = &self.tree {
            return tree.visible();
        }
        self.source
            .rendered()
            .iter()
            .map(|row| VisibleRow {
                id: row.id,
                data: Arc::clone(&row.data),
                level: 0,
                has_children: row.has_children(),
                expanded: self.expanded_details.contains(&row.id),
            })
            .collect()
    }

    fn visible_ids(&self) -> Vec<RowId> {
        self.visible_rows().iter().map(|row| row.id).collect()
    }

    /// Flips a row's expansion and returns the new state.
    ///
    /// In a flat grid this opens or closes the row's detail area. `None` when
    /// the row cannot expand.
    pub fn toggle_expanded(&mut self, id: RowId) -> Option<bool> {
        let expanded = match self.tree.as_mut() {
            Some(tree) => tree.toggle(id)?,
            None => {
                if !self.expandable_rows || !self.is_rendered(id) {
                    return None;
                }
                if self.expanded_details.remove(&id) {
                    false
                } else {
                    self.expanded_details.insert(id);
                    true
                }
            }
        };
        self.events.push(GridEvent::RowExpandChange { row: id, expanded });
        self.events
            .push(GridEvent::ExpandedRowsChange(self.expanded_rows()));
        Some(expanded)
    }

    fn is_rendered(&self, id: RowId) -> bool {
        self.source.rendered().iter().any(|row| row.id == id)
    }

    pub fn expand_all(&mut self) {
        match self.tree.as_mut() {
            Some(tree) => tree.expand_all(),
            None if self.expandable_rows => {
                let ids: Vec<RowId> = self.source.rendered().iter().map(|r| r.id).collect();
                self.expanded_details.extend(ids);
            }
            None => return,
        }
        self.events
            .push(GridEvent::ExpandedRowsChange(self.expanded_rows()));
    }

    pub fn collapse_all(&mut self) {
        match self.tree.as_mut() {
            Some(tree) => tree.collapse_all(),
            None if self.expandable_rows => self.expanded_details.clear(),
            None => return,
        }
        self.events
            .push(GridEvent::ExpandedRowsChange(self.expanded_rows()));
    }

    /// `true` if any expandable root is expanded.
    pub fn any_expanded(&self) -> bool {
        match &self.tree {
            Some(tree) => tree.any_expanded(),
            None => !self.expanded_details.is_empty(),
        }
    }

    /// `true` if every expandable root is expanded.
    pub fn all_expanded(&self) -> bool {
        match &self.tree {
            Some(tree) => tree.all_expanded(),
            None => {
                let rendered = self.source.rendered();
                !rendered.is_empty()
                    && rendered
                        .iter()
                        .all(|row| self.expanded_details.contains(&row.id))
            }
        }
    }

    /// Expanded rows in display order.
    pub fn expanded_rows(&self) -> Vec<RowId> {
        match &self.tree {
            Some(tree) => tree.expanded_rows(),
            None => {
                let mut ids: Vec<_> = self.expanded_details.iter().copied().collect();
                ids.sort();
                ids
            }
        }
    }

    /// Rebuilds tree metadata from scratch with a new expand level.
    pub fn set_initial_expand_level(&mut self, level: Option<usize>) {
        let Some(config) = self.tree_config.as_mut() else {
            return;
        };
        config.initial_expand_level = level;
        self.tree = None;
        self.rebuild_tree();
        self.events
            .push(GridEvent::ExpandedRowsChange(self.expanded_rows()));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selected(&self) -> Vec<RowId> {
        self.selection.selected()
    }

    /// Toggles a row's selection control.
    pub fn toggle_row(&mut self, id: RowId) -> Option<SelectionChange> {
        if self.source.row(id).is_none() {
            warn!("Ignoring selection of unknown row {}", id);
            return None;
        }
        if self.tree.as_ref().is_some_and(|tree| !tree.contains(id)) {
            debug!("Ignoring selection of row {} outside the tree view", id);
            return None;
        }
        let change = self.selection.toggle(id, hierarchy(&self.tree))?;
        self.events.push(GridEvent::SelectionChange(change.clone()));
        Some(change)
    }

    /// Handles the header checkbox: checks every visible row, or unchecks
    /// them all when all are checked.
    pub fn toggle_all_visible(&mut self) -> Option<SelectionChange> {
        let visible = self.visible_ids();
        let change = self.selection.toggle_all(&visible, hierarchy(&self.tree))?;
        self.events.push(GridEvent::SelectionChange(change.clone()));
        Some(change)
    }

    pub fn clear_selection(&mut self) -> Option<SelectionChange> {
        let change = self.selection.clear()?;
        self.events.push(GridEvent::SelectionChange(change.clone()));
        Some(change)
    }

    pub fn row_checked(&self, id: RowId) -> bool {
        self.selection.is_checked(id, hierarchy(&self.tree))
    }

    pub fn row_indeterminate(&self, id: RowId) -> bool {
        self.selection.is_indeterminate(id, hierarchy(&self.tree))
    }

    pub fn all_visible_checked(&self) -> bool {
        self.selection
            .all_checked(&self.visible_ids(), hierarchy(&self.tree))
    }

    pub fn some_visible_checked(&self) -> bool {
        self.selection
            .some_checked(&self.visible_ids(), hierarchy(&self.tree))
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Drains queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }
}

fn hierarchy<T: RowData>(tree: &Option<TreeModel<T>>) -> Option<&dyn Hierarchy> {
    tree.as_ref().map(|t| t as &dyn Hierarchy)
}

impl<T: RowData + std::fmt::Debug> std::fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("source", &self.source)
            .field("columns", &self.columns.len())
            .field("selection", &self.selection)
            .field("tree", &self.tree_config)
            .field("events", &self.events.len())
            .finish()
    }
}

/// Mutable access to a grid's data source; see [`Grid::source_mut`].
pub struct SourceGuard<'a, T: RowData> {
    grid: &'a mut Grid<T>,
}

impl<T: RowData> Deref for SourceGuard<'_, T> {
    type Target = GridDataSource<T>;

    fn deref(&self) -> &Self::Target {
        &self.grid.source
    }
}

impl<T: RowData> DerefMut for SourceGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.grid.source
    }
}

impl<T: RowData> Drop for SourceGuard<'_, T> {
    fn drop(&mut self) {
        self.grid.sync();
    }
}
