//! Data grid engine
//!
//! Computes the filtered, sorted, paginated and optionally hierarchical view of
//! a row collection, and keeps selection, expansion and column layout state
//! consistent with it. Rendering is left to the host.

pub mod error;
pub mod grid;
pub mod layout;
pub mod model;
pub mod pagination;
pub mod selection;
pub mod source;
pub mod tree;

pub use error::{GridError, Result};
pub use grid::{Grid, GridConfig, GridEvent, TreeConfig};

pub mod prelude {
    pub use crate::error::{GridError, Result};
    pub use crate::grid::{Grid, GridConfig, GridEvent, TreeConfig};
    pub use crate::layout::{ColumnLayout, ColumnSpec, ColumnWidth, LayoutConfig};
    pub use crate::model::{Record, RowData, RowId, Value, ViewRow};
    pub use crate::pagination::{PageEvent, PageItem, Pagination};
    pub use crate::selection::{SelectionChange, SelectionMode};
    pub use crate::source::{
        DataSourceConfig, FilterSpec, GridDataSource, PageRequest, PaginatorState,
        SortDirection, SortKey, SortState,
    };
    pub use crate::tree::{TreeModel, VisibleRow};
}
