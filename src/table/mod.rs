//! Live table engine.
//!
//! Every snapshot goes through the same pipeline:
//! filter -> customize -> sort -> render. [`TableController`] owns the
//! pipeline inputs (query, sort column, display modes, marks) and the
//! selection, and re-runs it on every update or interaction.

pub mod controller;
pub mod customize;
pub mod filter;
pub mod render;
pub mod sort;

pub use controller::{DecorateFn, TableController};
pub use customize::{ColumnOptions, ColumnPlan, customize};
pub use filter::{FUZZY_PREFIX, FilterError, LABEL_PREFIX, Query, filter, filter_toast};
pub use render::{Cell, ColorerFn, MaxyPad, RowColor, default_colorer};
pub use sort::{SortColumn, sort};
