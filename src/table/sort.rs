//! Sort engine: stable ordering of snapshot rows by one column.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::{Header, RowEvent};
use crate::util::{parse_age, parse_quantity};

/// Current sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    pub name: String,
    pub asc: bool,
}

impl SortColumn {
    pub fn new(name: impl Into<String>, asc: bool) -> Self {
        Self {
            name: name.into(),
            asc,
        }
    }

    /// Sorts by `name`. Selecting the current column again reverses the
    /// direction, a different column starts at `default_asc`.
    pub fn toggle(&mut self, name: &str, default_asc: bool) {
        if self.name == name {
            self.asc = !self.asc;
        } else {
            self.name = name.to_string();
            self.asc = default_asc;
        }
    }

    pub fn invert(&mut self) {
        self.asc = !self.asc;
    }
}

impl Default for SortColumn {
    fn default() -> Self {
        Self::new(crate::model::NAME_COL, true)
    }
}

/// Where to sort: resolved column index and whether a fallback happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTarget {
    /// Index into the full header.
    pub index: usize,
    pub is_age: bool,
    pub fallback: bool,
}

/// Resolves `col` against the visible column indices of `header`. An absent
/// column falls back to the first visible one.
pub fn resolve(header: &Header, visible: &[usize], col: &SortColumn) -> Option<SortTarget> {
    let found = visible
        .iter()
        .copied()
        .find(|&i| header.get(i).is_some_and(|c| c.name == col.name));
    let (index, fallback) = match found {
        Some(i) => (i, false),
        None => (*visible.first()?, true),
    };

    Some(SortTarget {
        index,
        is_age: header.is_time_col(index),
        fallback,
    })
}

/// Sorts `rows` in place by field `col`. Equal keys keep their input order.
///
/// Age columns compare elapsed durations: ascending puts the most recent
/// first. Unparseable ages sort last in either direction.
pub fn sort(rows: &mut [Arc<RowEvent>], col: usize, is_age: bool, asc: bool) {
    rows.sort_by(|a, b| {
        let va = a.row.fields.get(col).map(String::as_str).unwrap_or("");
        let vb = b.row.fields.get(col).map(String::as_str).unwrap_or("");
        if is_age {
            cmp_age(va, vb, asc)
        } else {
            let ord = cmp_value(va, vb);
            if asc { ord } else { ord.reverse() }
        }
    });
}

fn cmp_age(a: &str, b: &str, asc: bool) -> Ordering {
    match (parse_age(a), parse_age(b)) {
        (Some(x), Some(y)) => {
            if asc {
                x.cmp(&y)
            } else {
                y.cmp(&x)
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Numeric comparison when both values are numbers, lexical when neither
/// is. Numbers order before everything else so the order stays total.
pub fn cmp_value(a: &str, b: &str) -> Ordering {
    match (parse_quantity(a), parse_quantity(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeaderColumn, Row};
    use proptest::prelude::*;

    fn rows(data: &[(&str, &[&str])]) -> Vec<Arc<RowEvent>> {
        data.iter()
            .map(|(id, fields)| {
                Arc::new(RowEvent::new(Row::new(
                    *id,
                    fields.iter().map(|s| s.to_string()).collect(),
                )))
            })
            .collect()
    }

    fn ids(rows: &[Arc<RowEvent>]) -> Vec<&str> {
        rows.iter().map(|r| r.row.id.as_str()).collect()
    }

    #[test]
    fn test_age_ascending_most_recent_first() {
        let mut rr = rows(&[("a", &["a", "5m"]), ("b", &["b", "1m"])]);
        sort(&mut rr, 1, true, true);
        assert_eq!(ids(&rr), vec!["b", "a"]);

        sort(&mut rr, 1, true, false);
        assert_eq!(ids(&rr), vec!["a", "b"]);
    }

    #[test]
    fn test_age_not_lexical() {
        // Lexically "10m" < "9s".
        let mut rr = rows(&[("old", &["10m"]), ("new", &["9s"]), ("older", &["2d3h"])]);
        sort(&mut rr, 0, true, true);
        assert_eq!(ids(&rr), vec!["new", "old", "older"]);
    }

    #[test]
    fn test_age_unknown_last() {
        let mut rr = rows(&[("u", &["<unknown>"]), ("a", &["5m"]), ("b", &["1m"])]);
        sort(&mut rr, 0, true, true);
        assert_eq!(ids(&rr), vec!["b", "a", "u"]);
        sort(&mut rr, 0, true, false);
        assert_eq!(ids(&rr), vec!["a", "b", "u"]);
    }

    #[test]
    fn test_numeric_and_lexical() {
        let mut rr = rows(&[("a", &["10"]), ("b", &["9"]), ("c", &["100"])]);
        sort(&mut rr, 0, false, true);
        assert_eq!(ids(&rr), vec!["b", "a", "c"]);

        let mut rr = rows(&[("a", &["250m"]), ("b", &["1"]), ("c", &["50m"])]);
        sort(&mut rr, 0, false, false);
        assert_eq!(ids(&rr), vec!["b", "a", "c"]);

        let mut rr = rows(&[("x", &["redis"]), ("y", &["api"]), ("z", &["nginx"])]);
        sort(&mut rr, 0, false, true);
        assert_eq!(ids(&rr), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_numbers_before_words() {
        assert_eq!(cmp_value("9", "10"), Ordering::Less);
        assert_eq!(cmp_value("10", "5x"), Ordering::Less);
        assert_eq!(cmp_value("9", "5x"), Ordering::Less);
        assert_eq!(cmp_value("<none>", "0"), Ordering::Greater);

        let mut rr = rows(&[("w", &["5x"]), ("a", &["10"]), ("b", &["9"]), ("n", &["n/a"])]);
        sort(&mut rr, 0, false, true);
        assert_eq!(ids(&rr), vec!["b", "a", "w", "n"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut rr = rows(&[
            ("1", &["b", "Running"]),
            ("2", &["a", "Pending"]),
            ("3", &["c", "Running"]),
            ("4", &["d", "Pending"]),
            ("5", &["e", "Running"]),
        ]);
        sort(&mut rr, 1, false, true);
        assert_eq!(ids(&rr), vec!["2", "4", "1", "3", "5"]);

        // Descending must not reverse equal keys either.
        sort(&mut rr, 1, false, false);
        assert_eq!(ids(&rr), vec!["1", "3", "5", "2", "4"]);
    }

    #[test]
    fn test_toggle() {
        let mut sc = SortColumn::new("NAME", true);
        sc.toggle("NAME", true);
        assert!(!sc.asc);
        sc.toggle("NAME", true);
        assert!(sc.asc);

        sc.toggle("AGE", false);
        assert_eq!(sc, SortColumn::new("AGE", false));
        sc.invert();
        assert!(sc.asc);
    }

    #[test]
    fn test_resolve_fallback() {
        let header = Header::new(vec![
            HeaderColumn::new("NAMESPACE"),
            HeaderColumn::new("NAME"),
            HeaderColumn::new("AGE").time(),
        ]);
        let visible = [1, 2];

        let t = resolve(&header, &visible, &SortColumn::new("AGE", true)).unwrap();
        assert_eq!(t, SortTarget { index: 2, is_age: true, fallback: false });

        // NAMESPACE exists in the header but is not visible.
        let t = resolve(&header, &visible, &SortColumn::new("NAMESPACE", true)).unwrap();
        assert_eq!(t, SortTarget { index: 1, is_age: false, fallback: true });

        assert_eq!(resolve(&header, &[], &SortColumn::default()), None);
    }

    const KEYS: &[&str] = &["a", "b", "Running", "1", "10", "250m", "5x", ""];
    const AGES: &[&str] = &["1m", "5m", "2h", "30s", "<unknown>"];

    fn keyed(keys: &[&str]) -> Vec<Arc<RowEvent>> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| Arc::new(RowEvent::new(Row::new(i.to_string(), vec![k.to_string()]))))
            .collect()
    }

    fn position(re: &RowEvent) -> usize {
        re.row.id.parse().unwrap()
    }

    proptest! {
        #[test]
        fn prop_sort_is_stable(
            keys in prop::collection::vec(prop::sample::select(KEYS), 0..40),
            asc in any::<bool>(),
        ) {
            let mut rr = keyed(&keys);
            sort(&mut rr, 0, false, asc);
            for pair in rr.windows(2) {
                let (a, b) = (&pair[0].row.fields[0], &pair[1].row.fields[0]);
                let ord = if asc { cmp_value(a, b) } else { cmp_value(b, a) };
                prop_assert_ne!(ord, Ordering::Greater);
                if ord == Ordering::Equal {
                    prop_assert!(position(&pair[0]) < position(&pair[1]));
                }
            }
        }

        #[test]
        fn prop_age_sort_is_stable(
            ages in prop::collection::vec(prop::sample::select(AGES), 0..40),
            asc in any::<bool>(),
        ) {
            let mut rr = keyed(&ages);
            sort(&mut rr, 0, true, asc);
            for pair in rr.windows(2) {
                let ord = cmp_age(&pair[0].row.fields[0], &pair[1].row.fields[0], asc);
                prop_assert_ne!(ord, Ordering::Greater);
                if ord == Ordering::Equal {
                    prop_assert!(position(&pair[0]) < position(&pair[1]));
                }
            }
        }
    }
}
