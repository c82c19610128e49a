//! Column widths, flex values and frozen (sticky) column placement.
//!
//! Frozen columns always form a prefix: every column up to the last one
//! flagged `freeze` is pinned, whether or not it carries the flag itself.

use std::collections::HashMap;

use log::debug;

use crate::error::{GridError, Result};

/// Width used when a column specifies none.
pub const DEFAULT_COLUMN_WIDTH: f32 = 150.0;

/// Smallest width a manual resize may produce.
pub const MIN_COLUMN_WIDTH: f32 = 40.0;

/// Width of the row-number lane.
pub const ROW_NUMBER_LANE_WIDTH: f32 = 48.0;

/// Width of the selection checkbox lane.
pub const SELECTION_LANE_WIDTH: f32 = 40.0;

/// Width of the expand toggle lane.
pub const EXPAND_LANE_WIDTH: f32 = 40.0;

/// Stacking base for frozen data columns.
pub const FROZEN_Z_INDEX_BASE: u32 = 20;

/// Stacking of reserved lanes in body rows.
pub const LANE_Z_INDEX: u32 = 2;

/// Stacking of reserved lanes in the header row.
pub const LANE_HEADER_Z_INDEX: u32 = 3;

/// Requested width of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in pixels.
    Px(f32),
    /// Grow to take a share of the remaining space.
    Fill,
}

/// Column configuration.
///
/// A column without a field is a custom column: it has no value to sort by.
///
/// # Examples
///
/// ```
/// use datagrid::layout::ColumnSpec;
///
/// let columns = vec![
///     ColumnSpec::new("id", "ID").width(80.0).frozen(),
///     ColumnSpec::new("name", "Name").sortable().resizable(),
///     ColumnSpec::custom("Actions").fill(),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Field the column displays, `None` for custom columns.
    pub field: Option<String>,
    /// Header text.
    pub title: String,
    pub sortable: bool,
    pub resizable: bool,
    /// Pin this column and every column before it.
    pub freeze: bool,
    pub width: Option<ColumnWidth>,
}

impl ColumnSpec {
    /// Creates a column bound to a field.
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::custom(title)
        }
    }

    /// Creates a custom column with no field.
    pub fn custom(title: impl Into<String>) -> Self {
        Self {
            field: None,
            title: title.into(),
            sortable: false,
            resizable: false,
            freeze: false,
            width: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn resizable(mut self) -> Self {
        self.resizable = true;
        self
    }

    pub fn frozen(mut self) -> Self {
        self.freeze = true;
        self
    }

    pub fn width(mut self, px: f32) -> Self {
        self.width = Some(ColumnWidth::Px(px));
        self
    }

    pub fn fill(mut self) -> Self {
        self.width = Some(ColumnWidth::Fill);
        self
    }

    /// Returns `true` for columns without a field.
    pub fn is_custom(&self) -> bool {
        self.field.is_none()
    }

    /// The field to sort by, if clicking the header should sort.
    pub fn sort_field(&self) -> Option<&str> {
        self.field.as_deref().filter(|_| self.sortable)
    }
}

/// Identity of a column within one column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(usize);

/// Width after overrides and defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedWidth {
    Fixed(f32),
    Fill,
}

impl ResolvedWidth {
    /// CSS `flex` shorthand for this width.
    pub fn flex(&self) -> String {
        match self {
            ResolvedWidth::Fixed(px) => format!("0 0 {}px", px),
            ResolvedWidth::Fill => "1 1 0".to_string(),
        }
    }

    pub fn px(&self) -> Option<f32> {
        match self {
            ResolvedWidth::Fixed(px) => Some(*px),
            ResolvedWidth::Fill => None,
        }
    }
}

/// Pinning of a frozen column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sticky {
    /// Left offset in pixels; `None` when a column before it has no fixed width.
    pub left: Option<f32>,
    pub z_index: u32,
}

/// Computed placement of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub id: ColumnId,
    pub index: usize,
    pub width: ResolvedWidth,
    pub flex: String,
    /// `Some` for columns in the frozen prefix.
    pub sticky: Option<Sticky>,
}

impl ColumnLayout {
    pub fn is_frozen(&self) -> bool {
        self.sticky.is_some()
    }
}

/// Reserved lanes drawn before the data columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    RowNumber,
    Selection,
    Expand,
}

/// Layout configuration.
///
/// # Example
///
/// ```
/// use datagrid::layout::LayoutConfig;
///
/// let config = LayoutConfig::default()
///     .with_row_number_lane()
///     .with_selection_lane();
/// assert_eq!(config.reserved_width(), 88.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Width for columns that specify none.
    ///
    /// Default: 150
    pub default_width: f32,

    /// Lower bound for manual resizes.
    ///
    /// Default: 40
    pub min_width: f32,

    /// Row-number lane width, if shown.
    pub row_number_lane: Option<f32>,

    /// Selection lane width, if shown.
    pub selection_lane: Option<f32>,

    /// Expand lane width, if shown.
    pub expand_lane: Option<f32>,

    /// In tree mode the selection and expand controls sit inside the first
    /// data column, so their lanes do not offset frozen columns.
    pub tree_mode: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_COLUMN_WIDTH,
            min_width: MIN_COLUMN_WIDTH,
            row_number_lane: None,
            selection_lane: None,
            expand_lane: None,
            tree_mode: false,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_width(mut self, width: f32) -> Self {
        self.default_width = width;
        self
    }

    pub fn with_row_number_lane(mut self) -> Self {
        self.row_number_lane = Some(ROW_NUMBER_LANE_WIDTH);
        self
    }

    pub fn with_selection_lane(mut self) -> Self {
        self.selection_lane = Some(SELECTION_LANE_WIDTH);
        self
    }

    pub fn with_expand_lane(mut self) -> Self {
        self.expand_lane = Some(EXPAND_LANE_WIDTH);
        self
    }

    pub fn with_tree_mode(mut self, tree_mode: bool) -> Self {
        self.tree_mode = tree_mode;
        self
    }

    /// Total width of the lanes that push frozen columns to the right.
    pub fn reserved_width(&self) -> f32 {
        let mut width = self.row_number_lane.unwrap_or(0.0);
        if !self.tree_mode {
            width += self.selection_lane.unwrap_or(0.0);
            width += self.expand_lane.unwrap_or(0.0);
        }
        width
    }

    /// Left offset of a reserved lane, `None` if the lane is not shown.
    pub fn lane_left(&self, lane: Lane) -> Option<f32> {
        let row_number = self.row_number_lane.unwrap_or(0.0);
        let selection = self.selection_lane.unwrap_or(0.0);
        match lane {
            Lane::RowNumber => self.row_number_lane.map(|_| 0.0),
            Lane::Selection => self.selection_lane.map(|_| row_number),
            Lane::Expand => self.expand_lane.map(|_| row_number + selection),
        }
    }
}

/// Stacking of a reserved lane cell. Always below frozen data columns.
pub fn lane_z_index(header: bool) -> u32 {
    if header {
        LANE_HEADER_Z_INDEX
    } else {
        LANE_Z_INDEX
    }
}

/// Resolves widths and frozen placement for a column set.
///
/// Layouts are recomputed when the columns, a manual width or the
/// configuration change, and cached in between.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayoutEngine {
    columns: Vec<(ColumnId, ColumnSpec)>,
    overrides: HashMap<ColumnId, f32>,
    config: LayoutConfig,
    next_id: usize,
    layouts: Vec<ColumnLayout>,
}

impl ColumnLayoutEngine {
    pub fn new(columns: Vec<ColumnSpec>, config: LayoutConfig) -> Self {
        let mut engine = Self {
            config,
            ..Self::default()
        };
        engine.set_columns(columns);
        engine
    }

    /// Replaces the column set. Manual widths of the old columns are dropped.
    pub fn set_columns(&mut self, columns: Vec<ColumnSpec>) {
        self.overrides.clear();
        self.columns = columns
            .into_iter()
            .map(|spec| {
                let id = ColumnId(self.next_id);
                self.next_id += 1;
                (id, spec)
            })
            .collect();
        self.recompute();
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.recompute();
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn spec(&self, index: usize) -> Option<&ColumnSpec> {
        self.columns.get(index).map(|(_, spec)| spec)
    }

    pub fn specs(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().map(|(_, spec)| spec)
    }

    pub fn column_id(&self, index: usize) -> Result<ColumnId> {
        self.columns
            .get(index)
            .map(|(id, _)| *id)
            .ok_or_else(|| GridError::unknown_column(index, self.columns.len()))
    }

    pub fn layouts(&self) -> &[ColumnLayout] {
        &self.layouts
    }

    pub fn layout(&self, index: usize) -> Option<&ColumnLayout> {
        self.layouts.get(index)
    }

    // -------------------------------------------------------------------------
    // Manual widths
    // -------------------------------------------------------------------------

    /// Sets a manual width, clamped to the configured minimum.
    ///
    /// Returns `false` for unknown or non-resizable columns.
    pub fn resize(&mut self, id: ColumnId, width: f32) -> bool {
        let resizable = self
            .columns
            .iter()
            .any(|(column, spec)| *column == id && spec.resizable);
        if !resizable || !width.is_finite() {
            return false;
        }
        let width = width.max(self.config.min_width);
        debug!("Column {:?} resized to {}px", id, width);
        self.overrides.insert(id, width);
        self.recompute();
        true
    }

    /// Removes a manual width. Returns `true` if one was set.
    pub fn reset_width(&mut self, id: ColumnId) -> bool {
        let removed = self.overrides.remove(&id).is_some();
        if removed {
            self.recompute();
        }
        removed
    }

    pub fn width_override(&self, id: ColumnId) -> Option<f32> {
        self.overrides.get(&id).copied()
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    fn resolve(&self, id: ColumnId, spec: &ColumnSpec) -> ResolvedWidth {
        if let Some(px) = self.overrides.get(&id) {
            return ResolvedWidth::Fixed(*px);
        }
        match spec.width {
            Some(ColumnWidth::Px(px)) => ResolvedWidth::Fixed(px),
            Some(ColumnWidth::Fill) => ResolvedWidth::Fill,
            None => ResolvedWidth::Fixed(self.config.default_width),
        }
    }

    /// Index of the last column flagged `freeze`.
    pub fn frozen_end(&self) -> Option<usize> {
        self.columns.iter().rposition(|(_, spec)| spec.freeze)
    }

    pub fn is_frozen(&self, index: usize) -> bool {
        self.frozen_end().is_some_and(|end| index <= end)
    }

    fn recompute(&mut self) {
        let frozen_end = self.frozen_end();
        let reserved = self.config.reserved_width();

        // Running left edge; `None` once a frozen column has no fixed width.
        let mut left = Some(reserved);
        let mut layouts = Vec::with_capacity(self.columns.len());

        for (index, (id, spec)) in self.columns.iter().enumerate() {
            let width = self.resolve(*id, spec);
            let sticky = frozen_end.filter(|end| index <= *end).map(|end| {
                let sticky = Sticky {
                    left,
                    z_index: FROZEN_Z_INDEX_BASE + (end - index) as u32,
                };
                left = left.zip(width.px()).map(|(l, w)| l + w);
                sticky
            });
            layouts.push(ColumnLayout {
                id: *id,
                index,
                width,
                flex: width.flex(),
                sticky,
            });
        }

        debug!(
            "Column layout: {} columns, frozen through {:?}",
            layouts.len(),
            frozen_end
        );
        self.layouts = layouts;
    }

    /// Distributes `available` pixels: fixed columns keep their width and
    /// fill columns split what is left equally.
    pub fn distribute(&self, available: f32) -> Vec<f32> {
        let fixed: f32 = self.layouts.iter().filter_map(|l| l.width.px()).sum();
        let fill_count = self
            .layouts
            .iter()
            .filter(|l| l.width == ResolvedWidth::Fill)
            .count();
        let remaining = (available - self.config.reserved_width() - fixed).max(0.0);
        let share = if fill_count > 0 {
            remaining / fill_count as f32
        } else {
            0.0
        };
        self.layouts
            .iter()
            .map(|l| l.width.px().unwrap_or(share))
            .collect()
    }

    /// Sum of fixed widths plus reserved lanes.
    pub fn total_fixed_width(&self) -> f32 {
        self.config.reserved_width() + self.layouts.iter().filter_map(|l| l.width.px()).sum::<f32>()
    }
}
