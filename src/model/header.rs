//! Table header: ordered column descriptors.

use std::fmt;

/// Name of the namespace column.
pub const NAMESPACE_COL: &str = "NAMESPACE";
/// Name of the resource name column.
pub const NAME_COL: &str = "NAME";
/// Name of the validity column used by the toast filter.
pub const VALID_COL: &str = "VALID";
/// Name of the conventional age column.
pub const AGE_COL: &str = "AGE";

/// Formats a raw field value for display.
pub type DecoratorFn = fn(&str) -> String;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// A single column descriptor.
#[derive(Clone, Default)]
pub struct HeaderColumn {
    pub name: String,
    /// Only shown in wide mode.
    pub wide: bool,
    /// Time-like column: sorted by elapsed duration, never carries deltas.
    pub time: bool,
    /// Only meaningful when metrics are available.
    pub mx: bool,
    pub align: Align,
    pub decorator: Option<DecoratorFn>,
}

impl HeaderColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    pub fn time(mut self) -> Self {
        self.time = true;
        self
    }

    pub fn mx(mut self) -> Self {
        self.mx = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn decorator(mut self, f: DecoratorFn) -> Self {
        self.decorator = Some(f);
        self
    }

    /// Applies the column decorator, identity if none.
    pub fn decorate(&self, value: &str) -> String {
        match self.decorator {
            Some(f) => f(value),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for HeaderColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderColumn")
            .field("name", &self.name)
            .field("wide", &self.wide)
            .field("time", &self.time)
            .field("mx", &self.mx)
            .field("align", &self.align)
            .field("decorator", &self.decorator.is_some())
            .finish()
    }
}

impl PartialEq for HeaderColumn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.wide == other.wide
            && self.time == other.time
            && self.mx == other.mx
            && self.align == other.align
    }
}

/// Ordered column descriptors. Column names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header(pub Vec<HeaderColumn>);

impl Header {
    pub fn new(columns: Vec<HeaderColumn>) -> Self {
        Self(columns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderColumn> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HeaderColumn> {
        self.0.get(index)
    }

    /// Returns the column index for `name`. Wide columns are only
    /// considered when `include_wide` is set.
    pub fn index_of(&self, name: &str, include_wide: bool) -> Option<usize> {
        self.0
            .iter()
            .position(|c| c.name == name && (include_wide || !c.wide))
    }

    /// Column names visible for the given display mode.
    pub fn columns(&self, wide: bool) -> Vec<String> {
        self.0
            .iter()
            .filter(|c| wide || !c.wide)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Returns true if the column at `index` is time-like.
    pub fn is_time_col(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|c| c.time)
    }

    /// Index of the validity column, wide columns included.
    pub fn valid_col_index(&self) -> Option<usize> {
        self.index_of(VALID_COL, true)
    }

    /// Index of the resource name column, falling back to the first column.
    pub fn name_col_index(&self) -> usize {
        self.index_of(NAME_COL, true).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = &'a HeaderColumn;
    type IntoIter = std::slice::Iter<'a, HeaderColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header::new(vec![
            HeaderColumn::new("NAMESPACE"),
            HeaderColumn::new("NAME"),
            HeaderColumn::new("IP").wide(),
            HeaderColumn::new("VALID").wide(),
            HeaderColumn::new("AGE").time(),
        ])
    }

    #[test]
    fn index_of_respects_wide_flag() {
        let h = header();
        assert_eq!(h.index_of("NAME", false), Some(1));
        assert_eq!(h.index_of("IP", false), None);
        assert_eq!(h.index_of("IP", true), Some(2));
        assert_eq!(h.index_of("BLEE", true), None);
    }

    #[test]
    fn columns_for_mode() {
        let h = header();
        assert_eq!(h.columns(false), vec!["NAMESPACE", "NAME", "AGE"]);
        assert_eq!(h.columns(true).len(), 5);
    }

    #[test]
    fn special_columns() {
        let h = header();
        assert!(h.is_time_col(4));
        assert!(!h.is_time_col(1));
        assert!(!h.is_time_col(42));
        assert_eq!(h.valid_col_index(), Some(3));
        assert_eq!(h.name_col_index(), 1);
    }

    #[test]
    fn decorate_defaults_to_identity() {
        let plain = HeaderColumn::new("NAME");
        assert_eq!(plain.decorate("fred"), "fred");

        let shout = HeaderColumn::new("NAME").decorator(|s| s.to_uppercase());
        assert_eq!(shout.decorate("fred"), "FRED");
    }
}
