//! Rows and row events.

use super::Header;

/// Diff status of a row relative to the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffKind {
    /// Row ID not present in the previous snapshot.
    New,
    /// At least one field changed.
    Modified,
    #[default]
    Unchanged,
}

/// A single table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Unique within a snapshot.
    pub id: String,
    pub fields: Vec<String>,
}

impl Row {
    pub fn new(id: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Previous values per field. An empty string means "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deltas(pub Vec<String>);

impl Deltas {
    /// Returns true if no field recorded a previous value.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }

    /// Previous value of field `index`, if it changed.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0
            .get(index)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// A row together with its change information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowEvent {
    pub kind: DiffKind,
    pub row: Row,
    pub deltas: Deltas,
}

impl RowEvent {
    pub fn new(row: Row) -> Self {
        Self {
            kind: DiffKind::Unchanged,
            row,
            deltas: Deltas::default(),
        }
    }

    /// Computes the event for `row` given its previous incarnation.
    /// Time-like columns of `header` never record deltas.
    pub fn diff(header: &Header, prev: Option<&Row>, row: Row) -> Self {
        let Some(prev) = prev else {
            return Self {
                kind: DiffKind::New,
                row,
                deltas: Deltas::default(),
            };
        };

        let deltas: Vec<String> = row
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| match prev.fields.get(i) {
                Some(old) if old != field && !header.is_time_col(i) => old.clone(),
                _ => String::new(),
            })
            .collect();
        let deltas = Deltas(deltas);
        let kind = if deltas.is_blank() {
            DiffKind::Unchanged
        } else {
            DiffKind::Modified
        };

        Self { kind, row, deltas }
    }
}
