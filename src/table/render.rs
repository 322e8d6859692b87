//! Row renderer: turns snapshot rows into display cells.
//!
//! Cells carry a [`RowColor`] class rather than a terminal color so the
//! table engine stays independent of the drawing surface.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, warn};

use super::customize::ColumnPlan;
use super::sort::SortColumn;
use crate::model::{Align, DiffKind, Header, HeaderColumn, RowEvent};
use crate::util::parse_quantity;

/// Color class of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowColor {
    #[default]
    Std,
    Added,
    Modified,
    Pending,
    Completed,
    /// Unhealthy row. Wins over marks.
    Error,
    Marked,
}

/// Maps `(scope, header, row)` to a color class.
pub type ColorerFn = fn(&str, &Header, &RowEvent) -> RowColor;

/// Colors rows by diff kind.
pub fn default_colorer(_ns: &str, _h: &Header, re: &RowEvent) -> RowColor {
    match re.kind {
        DiffKind::New => RowColor::Added,
        DiffKind::Modified => RowColor::Modified,
        DiffKind::Unchanged => RowColor::Std,
    }
}

/// A single display cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub align: Align,
    pub color: RowColor,
    /// Row ID, set on the first column only.
    pub reference: Option<String>,
}

/// Sort direction indicators appended to the sorted header cell.
pub const ASC_INDICATOR: char = '↑';
pub const DESC_INDICATOR: char = '↓';

/// Per-pass column widths, indexed by visible column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaxyPad(pub Vec<usize>);

impl MaxyPad {
    /// Widest rendered value per visible column. Header names reserve one
    /// extra cell for the sort indicator.
    pub fn compute(plan: &ColumnPlan, rows: &[Arc<RowEvent>]) -> Self {
        let mut pads: Vec<usize> = plan
            .header
            .iter()
            .map(|c| c.name.chars().count() + 1)
            .collect();

        for re in rows {
            for (i, (&x, col)) in plan.indices.iter().zip(&plan.header).enumerate() {
                let Some(value) = re.row.fields.get(x) else {
                    continue;
                };
                let width = cell_text(col, value, re.deltas.get(x)).chars().count();
                if width > pads[i] {
                    pads[i] = width;
                }
            }
        }
        Self(pads)
    }

    pub fn get(&self, index: usize) -> usize {
        self.0.get(index).copied().unwrap_or(0)
    }
}

/// Decorated value plus a change annotation when `delta` is set and the
/// column is not time-like.
pub fn cell_text(col: &HeaderColumn, value: &str, delta: Option<&str>) -> String {
    let text = col.decorate(value);
    match delta {
        Some(old) if !col.time => format!("{text} ({})", delta_annotation(value, old)),
        _ => text,
    }
}

fn delta_annotation(value: &str, old: &str) -> String {
    match (parse_quantity(value), parse_quantity(old)) {
        (Some(new), Some(prev)) if new > prev => format!("↑ {old}"),
        (Some(new), Some(prev)) if new < prev => format!("↓ {old}"),
        _ => format!("Δ {old}"),
    }
}

fn pad(text: String, width: usize, align: Align) -> String {
    if align != Align::Left {
        return text;
    }
    format!("{text:<width$}")
}

/// Inputs shared by every row of a render pass.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Source header; colorers index raw fields through it.
    pub header: &'a Header,
    pub plan: &'a ColumnPlan,
    pub pads: &'a MaxyPad,
    pub colorer: ColorerFn,
    pub namespace: &'a str,
    pub marks: &'a HashSet<String>,
}

/// Renders one row into cells. Never fails: bad fields render blank.
pub fn render_row(ctx: &RenderContext<'_>, re: &RowEvent) -> Vec<Cell> {
    if re.row.fields.len() > ctx.plan.source_len {
        warn!(
            id = %re.row.id,
            fields = re.row.fields.len(),
            "row has more fields than header, skipping excess"
        );
    }

    let mut color = (ctx.colorer)(ctx.namespace, ctx.header, re);
    if ctx.marks.contains(&re.row.id) && color != RowColor::Error {
        color = RowColor::Marked;
    }

    ctx.plan
        .indices
        .iter()
        .zip(&ctx.plan.header)
        .enumerate()
        .map(|(i, (&x, col))| {
            let text = match re.row.fields.get(x) {
                Some(value) => cell_text(col, value, re.deltas.get(x)),
                None => {
                    error!(id = %re.row.id, column = %col.name, index = x, "field out of range");
                    String::new()
                }
            };
            Cell {
                text: pad(text, ctx.pads.get(i), col.align),
                align: col.align,
                color,
                reference: (i == 0).then(|| re.row.id.clone()),
            }
        })
        .collect()
}

/// Header cells with the sort indicator on the sorted column.
pub fn render_header(plan: &ColumnPlan, sort: &SortColumn) -> Vec<Cell> {
    plan.header
        .iter()
        .map(|col| {
            let text = if col.name == sort.name {
                let ind = if sort.asc { ASC_INDICATOR } else { DESC_INDICATOR };
                format!("{}{ind}", col.name)
            } else {
                col.name.clone()
            };
            Cell {
                text,
                align: col.align,
                ..Cell::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deltas, Row};
    use crate::table::customize::{ColumnOptions, customize};

    fn header() -> Header {
        Header::new(vec![
            HeaderColumn::new("NAME"),
            HeaderColumn::new("RESTARTS").align(Align::Right),
            HeaderColumn::new("STATUS").decorator(|s| s.to_lowercase()),
            HeaderColumn::new("AGE").time(),
        ])
    }

    fn event(id: &str, fields: &[&str]) -> RowEvent {
        RowEvent::new(Row::new(id, fields.iter().map(|s| s.to_string()).collect()))
    }

    fn render(re: &RowEvent, marks: &HashSet<String>, colorer: ColorerFn) -> Vec<Cell> {
        let header = header();
        let plan = customize(&header, ColumnOptions::default());
        let rows = vec![Arc::new(re.clone())];
        let pads = MaxyPad::compute(&plan, &rows);
        let ctx = RenderContext {
            header: &header,
            plan: &plan,
            pads: &pads,
            colorer,
            namespace: "default",
            marks,
        };
        render_row(&ctx, re)
    }

    #[test]
    fn decorates_and_pads_left_columns() {
        let re = event("a", &["a", "3", "Running", "5m"]);
        let cells = render(&re, &HashSet::new(), default_colorer);

        assert_eq!(cells.len(), 4);
        // "NAME" + indicator slot.
        assert_eq!(cells[0].text, "a    ");
        assert_eq!(cells[1].text, "3");
        assert_eq!(cells[2].text, "running");
        assert_eq!(cells[0].reference.as_deref(), Some("a"));
        assert!(cells[1..].iter().all(|c| c.reference.is_none()));
    }

    #[test]
    fn deltas_annotate_except_time_columns() {
        let mut re = event("a", &["a", "3", "Running", "5m"]);
        re.kind = DiffKind::Modified;
        re.deltas = Deltas(vec![
            String::new(),
            "1".into(),
            "Pending".into(),
            "4m".into(),
        ]);
        let cells = render(&re, &HashSet::new(), default_colorer);

        assert_eq!(cells[1].text, "3 (↑ 1)");
        assert_eq!(cells[2].text.trim_end(), "running (Δ Pending)");
        assert_eq!(cells[3].text.trim_end(), "5m");
        assert!(cells.iter().all(|c| c.color == RowColor::Modified));
    }

    #[test]
    fn changed_cells_pad_to_column_width() {
        let header = header();
        let plan = customize(&header, ColumnOptions::default());
        let mut changed = event("a", &["a", "0", "Running", "5m"]);
        changed.deltas = Deltas(vec![
            String::new(),
            String::new(),
            "Pending".into(),
            String::new(),
        ]);
        let wide = event("b", &["b", "0", "ContainerCreatingWithLongReason", "1m"]);
        let rows = vec![Arc::new(changed.clone()), Arc::new(wide)];
        let pads = MaxyPad::compute(&plan, &rows);
        let ctx = RenderContext {
            header: &header,
            plan: &plan,
            pads: &pads,
            colorer: default_colorer,
            namespace: "default",
            marks: &HashSet::new(),
        };

        let cells = render_row(&ctx, &changed);
        assert_eq!(pads.get(2), 31);
        assert!(cells[2].text.starts_with("running (Δ Pending)"));
        assert_eq!(cells[2].text.chars().count(), 31);
    }

    #[test]
    fn marks_override_unless_error() {
        let re = event("a", &["a", "0", "Running", "5m"]);
        let marks: HashSet<String> = ["a".to_string()].into();

        let cells = render(&re, &marks, default_colorer);
        assert_eq!(cells[0].color, RowColor::Marked);

        let cells = render(&re, &marks, |_, _, _| RowColor::Error);
        assert_eq!(cells[0].color, RowColor::Error);
    }

    #[test]
    fn short_rows_render_blank_cells() {
        let re = event("a", &["a", "0"]);
        let cells = render(&re, &HashSet::new(), default_colorer);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[3].text.trim(), "");
    }

    #[test]
    fn long_rows_skip_excess_fields() {
        let re = event("a", &["a", "0", "Running", "5m", "extra", "more"]);
        let cells = render(&re, &HashSet::new(), default_colorer);
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| !c.text.contains("extra")));
    }

    #[test]
    fn header_sort_indicator() {
        let plan = customize(&header(), ColumnOptions::default());
        let cells = render_header(&plan, &SortColumn::new("AGE", false));
        assert_eq!(cells[3].text, "AGE↓");
        assert_eq!(cells[0].text, "NAME");
    }
}
