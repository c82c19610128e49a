//! Data source: owns the row set and derives the rendered view
//!
//! The view is recomputed on every mutation in a fixed order: filter, then
//! sort, then paginate. Listeners receive it synchronously.

mod data_source;
mod filter;
mod listeners;
mod paginator;
mod sort;

pub use data_source::*;
pub use filter::*;
pub use listeners::{Listener, Subscription};
pub use paginator::*;
pub use sort::*;
