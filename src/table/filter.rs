//! Filter engine: derives a filtered view of a snapshot from a query.
//!
//! Query modes, by prefix:
//! - empty: identity
//! - `-l <selector>`: label selector, forwarded to the data source
//! - `-f <text>`: fuzzy match on the name column, best score first
//! - anything else: case-insensitive regex over the space-joined fields

use std::sync::Arc;

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use regex::RegexBuilder;
use tracing::debug;

use crate::model::{RowEvent, TableData};

/// Label selector query prefix.
pub const LABEL_PREFIX: &str = "-l";
/// Fuzzy query prefix.
pub const FUZZY_PREFIX: &str = "-f";

/// Errors raised while filtering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("invalid filter expression {query:?}: {message}")]
    InvalidExpression { query: String, message: String },
}

/// A parsed filter query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    Empty,
    /// Trimmed label selector.
    Label(&'a str),
    /// Trimmed fuzzy text.
    Fuzzy(&'a str),
    Regex(&'a str),
}

impl<'a> Query<'a> {
    pub fn parse(q: &'a str) -> Self {
        if q.is_empty() {
            return Query::Empty;
        }
        if let Some(rest) = q.strip_prefix(LABEL_PREFIX) {
            return Query::Label(rest.trim());
        }
        if let Some(rest) = q.strip_prefix(FUZZY_PREFIX) {
            return Query::Fuzzy(rest.trim());
        }
        Query::Regex(q)
    }
}

/// Returns true if `q` is a label selector query.
pub fn is_label_selector(q: &str) -> bool {
    matches!(Query::parse(q), Query::Label(_))
}

/// Returns true if `q` is a fuzzy query.
pub fn is_fuzzy_selector(q: &str) -> bool {
    matches!(Query::parse(q), Query::Fuzzy(_))
}

/// Extracts the selector of a label query.
pub fn trim_label_selector(q: &str) -> Option<&str> {
    match Query::parse(q) {
        Query::Label(sel) => Some(sel),
        _ => None,
    }
}

/// Applies `query` to `data`. Label queries are a pass-through.
pub fn filter(query: &str, data: &TableData) -> Result<TableData, FilterError> {
    match Query::parse(query) {
        Query::Empty | Query::Label(_) => Ok(data.clone()),
        Query::Fuzzy(q) => Ok(fuzzy_filter(q, data.header.name_col_index(), data)),
        Query::Regex(q) => rx_filter(q, data),
    }
}

/// Keeps rows flagged in the validity column. No-op without one.
pub fn filter_toast(data: &TableData) -> TableData {
    let Some(valid_x) = data.header.valid_col_index() else {
        return data.clone();
    };

    let rows = data
        .rows
        .iter()
        .filter(|re| re.row.fields.get(valid_x).is_some_and(|v| !v.is_empty()))
        .cloned()
        .collect();
    data.with_rows(rows)
}

/// Keeps rows whose joined fields match `q`, case-insensitively.
pub fn rx_filter(q: &str, data: &TableData) -> Result<TableData, FilterError> {
    let rx = RegexBuilder::new(q)
        .case_insensitive(true)
        .build()
        .map_err(|e| FilterError::InvalidExpression {
            query: q.to_string(),
            message: e.to_string(),
        })?;

    let rows = data
        .rows
        .iter()
        .filter(|re| rx.is_match(&re.row.fields.join(" ")))
        .cloned()
        .collect();
    Ok(data.with_rows(rows))
}

/// Fuzzy matches `q` against column `index`, best match first.
///
/// A candidate matches when the query is a subsequence of it whose first
/// character starts a word (start of value or after a separator).
/// Equal scores keep their snapshot order.
pub fn fuzzy_filter(q: &str, index: usize, data: &TableData) -> TableData {
    if q.is_empty() {
        return data.clone();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(q, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);
    let mut buf = Vec::new();

    let mut scored: Vec<(u32, &Arc<RowEvent>)> = data
        .rows
        .iter()
        .filter_map(|re| {
            let value = re.row.fields.get(index)?;
            if !word_anchored_subsequence(q, value) {
                return None;
            }
            let score = pattern.score(Utf32Str::new(value, &mut buf), &mut matcher)?;
            Some((score, re))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    debug!(query = q, matches = scored.len(), "fuzzy filter");

    data.with_rows(scored.into_iter().map(|(_, re)| re.clone()).collect())
}

fn is_word_start(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => matches!(c, '-' | '_' | '.' | '/' | ' ' | ':'),
    }
}

fn word_anchored_subsequence(q: &str, value: &str) -> bool {
    let query: Vec<char> = q
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let Some((&first, rest)) = query.split_first() else {
        return true;
    };
    let hay: Vec<char> = value.chars().flat_map(char::to_lowercase).collect();

    (0..hay.len()).any(|start| {
        let prev = start.checked_sub(1).map(|p| hay[p]);
        if hay[start] != first || !is_word_start(prev) {
            return false;
        }
        let mut remaining = rest.iter().peekable();
        for c in &hay[start + 1..] {
            if remaining.peek() == Some(&c) {
                remaining.next();
            }
        }
        remaining.peek().is_none()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Header, HeaderColumn, Row};
    use proptest::prelude::*;

    fn data(names: &[(&str, &str)]) -> TableData {
        let header = Header::new(vec![
            HeaderColumn::new("NAME"),
            HeaderColumn::new("STATUS"),
            HeaderColumn::new("VALID").wide(),
        ]);
        let rows = names
            .iter()
            .map(|(name, valid)| {
                RowEvent::new(Row::new(
                    *name,
                    vec![name.to_string(), "Running".into(), valid.to_string()],
                ))
            })
            .collect();
        TableData::new(header, rows, "default")
    }

    fn names(data: &TableData) -> Vec<&str> {
        data.ids()
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(Query::parse(""), Query::Empty);
        assert_eq!(Query::parse("-l app=web "), Query::Label("app=web"));
        assert_eq!(Query::parse("-f  ngx"), Query::Fuzzy("ngx"));
        assert_eq!(Query::parse("ngx"), Query::Regex("ngx"));
        assert!(is_label_selector("-lapp=web"));
        assert!(!is_label_selector("app"));
        assert!(is_fuzzy_selector("-f a"));
        assert_eq!(trim_label_selector("-l  a=b"), Some("a=b"));
    }

    #[test]
    fn test_empty_and_label_are_identity() {
        let d = data(&[("alpha", ""), ("beta", "")]);
        assert_eq!(filter("", &d).unwrap(), d);
        assert_eq!(filter("-l app=web", &d).unwrap(), d);
    }

    #[test]
    fn test_fuzzy_scenario() {
        let d = data(&[("alpha", ""), ("beta", ""), ("gamma", "")]);
        let out = filter("-f a", &d).unwrap();
        assert_eq!(names(&out), vec!["alpha"]);
    }

    #[test]
    fn test_fuzzy_matches_word_starts() {
        let d = data(&[
            ("nginx-7d9f", ""),
            ("redis-0", ""),
            ("api-nginx", ""),
            ("engine", ""),
        ]);
        let out = filter("-f ngx", &d).unwrap();
        let got = names(&out);
        assert_eq!(got.len(), 2);
        assert!(got.contains(&"nginx-7d9f"));
        assert!(got.contains(&"api-nginx"));
    }

    #[test]
    fn test_fuzzy_ties_keep_order() {
        let d = data(&[("web-b", ""), ("db", ""), ("web-a", "")]);
        let out = filter("-f web", &d).unwrap();
        assert_eq!(names(&out), vec!["web-b", "web-a"]);
    }

    #[test]
    fn test_regex_case_insensitive_over_all_fields() {
        let d = data(&[("alpha", ""), ("beta", "")]);
        let out = filter("ALP", &d).unwrap();
        assert_eq!(names(&out), vec!["alpha"]);

        let out = filter("running", &d).unwrap();
        assert_eq!(names(&out), vec!["alpha", "beta"]);

        // Fields are joined with a single space.
        let out = filter("beta running", &d).unwrap();
        assert_eq!(names(&out), vec!["beta"]);
    }

    #[test]
    fn test_regex_invalid() {
        let d = data(&[("alpha", "")]);
        let err = filter("zz(", &d).unwrap_err();
        assert!(matches!(err, FilterError::InvalidExpression { .. }));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let d = data(&[("alpha", ""), ("beta", ""), ("alpine", "")]);
        for q in ["al", "-f al", "^b", "-l x=y"] {
            let once = filter(q, &d).unwrap();
            let twice = filter(q, &once).unwrap();
            assert_eq!(names(&once), names(&twice), "query {q}");
        }
    }

    #[test]
    fn test_filter_output_is_subset() {
        let d = data(&[("alpha", ""), ("beta", ""), ("alpine", ""), ("gamma", "")]);
        for q in ["a", "-f a", "-f zz", "ph|mm"] {
            let out = filter(q, &d).unwrap();
            for re in &out.rows {
                assert!(d.rows.iter().any(|r| Arc::ptr_eq(r, re)), "query {q}");
            }
        }
    }

    #[test]
    fn test_toast() {
        let d = data(&[("alpha", ""), ("beta", "container crashed"), ("gamma", "")]);
        let toast = filter_toast(&d);
        assert_eq!(names(&toast), vec!["beta"]);
    }

    #[test]
    fn test_toast_without_valid_column_is_noop() {
        let header = Header::new(vec![HeaderColumn::new("NAME")]);
        let d = TableData::new(
            header,
            vec![RowEvent::new(Row::new("a", vec!["a".into()]))],
            "default",
        );
        assert_eq!(filter_toast(&d), d);
    }

    fn arb_table() -> impl Strategy<Value = TableData> {
        prop::collection::vec(("[a-z]{1,6}(-[a-z0-9]{1,4})?", any::<bool>()), 0..24).prop_map(
            |rows| {
                let header = Header::new(vec![
                    HeaderColumn::new("NAME"),
                    HeaderColumn::new("STATUS"),
                    HeaderColumn::new("VALID").wide(),
                ]);
                let rows = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, bad))| {
                        let valid = if bad { "crashed" } else { "" };
                        RowEvent::new(Row::new(
                            format!("{i}-{name}"),
                            vec![name, "Running".into(), valid.into()],
                        ))
                    })
                    .collect();
                TableData::new(header, rows, "default")
            },
        )
    }

    fn arb_query() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,3}",
            "[a-z]{1,3}".prop_map(|q| format!("{FUZZY_PREFIX} {q}")),
            "[a-z]{1,3}=[a-z]{1,3}".prop_map(|q| format!("{LABEL_PREFIX} {q}")),
        ]
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent(d in arb_table(), q in arb_query()) {
            let once = filter(&q, &d).unwrap();
            let twice = filter(&q, &once).unwrap();
            prop_assert_eq!(names(&once), names(&twice));
        }

        #[test]
        fn prop_filter_output_is_subset(d in arb_table(), q in arb_query()) {
            let out = filter(&q, &d).unwrap();
            prop_assert!(out.len() <= d.len());
            for re in &out.rows {
                prop_assert!(d.rows.iter().any(|r| Arc::ptr_eq(r, re)));
            }
        }

        #[test]
        fn prop_toast_keeps_only_flagged_rows(d in arb_table()) {
            let toast = filter_toast(&d);
            for re in &toast.rows {
                prop_assert!(d.rows.iter().any(|r| Arc::ptr_eq(r, re)));
                prop_assert_eq!(re.row.fields[2].as_str(), "crashed");
            }
        }
    }
}
