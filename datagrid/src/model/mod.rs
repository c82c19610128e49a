//! Row models

mod record;
mod row;
mod value;

pub use record::*;
pub(crate) use row::RowStore;
pub use row::{RowData, RowId, ViewRow};
pub use value::*;
