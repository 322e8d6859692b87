//! Row model: immutable tabular snapshots produced by a data source.
//!
//! A [`TableData`] is handed to the table controller by value and never
//! mutated in place. Derived views (filtered, sorted) are new values that
//! share the same row entries through [`Arc`].

mod header;
mod row;
pub mod scope;

use std::sync::Arc;

pub use header::{
    AGE_COL, Align, DecoratorFn, Header, HeaderColumn, NAME_COL, NAMESPACE_COL, VALID_COL,
};
pub use row::{Deltas, DiffKind, Row, RowEvent};

/// One point-in-time snapshot of tabular data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub header: Header,
    pub rows: Vec<Arc<RowEvent>>,
    /// Scope the snapshot was taken in (namespace, `all` or `-`).
    pub namespace: String,
}

impl TableData {
    pub fn new(header: Header, rows: Vec<RowEvent>, namespace: impl Into<String>) -> Self {
        Self {
            header,
            rows: rows.into_iter().map(Arc::new).collect(),
            namespace: namespace.into(),
        }
    }

    /// Builds a derived view sharing header and scope with `self`.
    pub fn with_rows(&self, rows: Vec<Arc<RowEvent>>) -> Self {
        Self {
            header: self.header.clone(),
            rows,
            namespace: self.namespace.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the row with the given ID.
    pub fn find_index(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|re| re.row.id == id)
    }

    /// Row event with the given ID.
    pub fn find(&self, id: &str) -> Option<&Arc<RowEvent>> {
        self.rows.iter().find(|re| re.row.id == id)
    }

    /// Row IDs in snapshot order.
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|re| re.row.id.as_str()).collect()
    }
}
