//! Table controller: runs the filter, customize, sort and render pipeline
//! on every snapshot or user interaction and owns the selection.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::customize::{ColumnOptions, ColumnPlan, customize};
use super::filter::{FilterError, Query, filter, filter_toast};
use super::render::{
    Cell, ColorerFn, MaxyPad, RenderContext, default_colorer, render_header, render_row,
};
use super::sort::{SortColumn, resolve, sort};
use crate::model::scope::{self, CLUSTER_SCOPE, NAMESPACE_ALL};
use crate::model::{Row, TableData};
use crate::source::{SourceError, TableListener};

/// Hook applied to every incoming snapshot before filtering.
pub type DecorateFn = fn(TableData) -> TableData;

/// Live table state for one resource kind.
#[derive(Debug)]
pub struct TableController {
    kind: String,
    /// Drill-down path (`ns/name`), replaces the scope in the title.
    path: Option<String>,
    /// Last snapshot, after decoration.
    data: TableData,
    query: String,
    filter_active: bool,
    sort_col: SortColumn,
    sort_fallback: bool,
    wide: bool,
    toast: bool,
    has_metrics: bool,
    view_columns: Vec<String>,
    colorer: ColorerFn,
    decorate: Option<DecorateFn>,
    marks: HashSet<String>,

    /// Filtered and sorted rows currently on screen.
    visible: TableData,
    plan: ColumnPlan,
    header_cells: Vec<Cell>,
    grid: Vec<Vec<Cell>>,
    selected: usize,
    tracked_id: Option<String>,
    last_error: Option<String>,
}

impl TableController {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: None,
            data: TableData::default(),
            query: String::new(),
            filter_active: false,
            sort_col: SortColumn::default(),
            sort_fallback: false,
            wide: false,
            toast: false,
            has_metrics: false,
            view_columns: Vec::new(),
            colorer: default_colorer,
            decorate: None,
            marks: HashSet::new(),
            visible: TableData::default(),
            plan: ColumnPlan::default(),
            header_cells: Vec::new(),
            grid: Vec::new(),
            selected: 0,
            tracked_id: None,
            last_error: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Switches to another resource kind. Query, marks and selection reset.
    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = kind.into();
        self.path = None;
        self.query.clear();
        self.filter_active = false;
        self.marks.clear();
        self.selected = 0;
        self.tracked_id = None;
        self.data = TableData::default();
        self.refresh();
    }

    pub fn set_path(&mut self, path: Option<String>) {
        self.path = path;
    }

    pub fn set_colorer(&mut self, colorer: ColorerFn) {
        self.colorer = colorer;
    }

    pub fn set_decorate(&mut self, decorate: Option<DecorateFn>) {
        self.decorate = decorate;
    }

    pub fn set_metrics(&mut self, has_metrics: bool) {
        self.has_metrics = has_metrics;
    }

    /// Explicit ordered column list for this kind; empty means header order.
    pub fn set_view_columns(&mut self, columns: Vec<String>) {
        self.view_columns = columns;
        self.refresh();
    }

    pub fn set_sort_col(&mut self, name: impl Into<String>, asc: bool) {
        self.sort_col = SortColumn::new(name, asc);
    }

    /// Stores a new snapshot and re-renders.
    pub fn update(&mut self, data: TableData) {
        let data = match self.decorate {
            Some(f) => f(data),
            None => data,
        };
        let before = self.marks.len();
        self.marks.retain(|id| data.find(id).is_some());
        if self.marks.len() != before {
            debug!(pruned = before - self.marks.len(), "dropped marks for vanished rows");
        }
        self.data = data;
        self.refresh();
    }

    /// Re-renders the last known snapshot.
    pub fn refresh(&mut self) {
        // A failed query is already reverted and kept in `last_error`.
        let _ = self.rebuild();
    }

    fn rebuild(&mut self) -> Result<(), FilterError> {
        let base = if self.toast {
            filter_toast(&self.data)
        } else {
            self.data.clone()
        };

        let mut result = Ok(());
        let filtered = match filter(&self.query, &base) {
            Ok(filtered) => filtered,
            Err(e) => {
                self.revert_filter(&e);
                result = Err(e);
                base
            }
        };

        let plan = customize(
            &filtered.header,
            ColumnOptions {
                wide: self.wide,
                explicit: &self.view_columns,
                metrics: self.has_metrics,
                cluster_wide: self.cluster_wide(),
            },
        );

        let mut rows = filtered.rows.clone();
        self.sort_fallback = false;
        if let Some(target) = resolve(&filtered.header, &plan.indices, &self.sort_col) {
            if target.fallback {
                if let Some(first) = plan.header.get(0) {
                    debug!(
                        requested = %self.sort_col.name,
                        fallback = %first.name,
                        "sort column not visible, using first column"
                    );
                    self.sort_col.name = first.name.clone();
                }
                self.sort_fallback = true;
            }
            // Fuzzy results stay in match-rank order.
            if !matches!(Query::parse(&self.query), Query::Fuzzy(q) if !q.is_empty()) {
                sort(&mut rows, target.index, target.is_age, self.sort_col.asc);
            }
        }
        let visible = filtered.with_rows(rows);

        let pads = MaxyPad::compute(&plan, &visible.rows);
        let ctx = RenderContext {
            header: &self.data.header,
            plan: &plan,
            pads: &pads,
            colorer: self.colorer,
            namespace: &self.data.namespace,
            marks: &self.marks,
        };
        self.grid = visible.rows.iter().map(|re| render_row(&ctx, re)).collect();
        self.header_cells = render_header(&plan, &self.sort_col);
        self.plan = plan;
        self.visible = visible;
        self.resolve_selection();
        result
    }

    fn revert_filter(&mut self, err: &FilterError) {
        warn!(error = %err, "invalid filter expression");
        self.query.clear();
        self.last_error = Some(err.to_string());
    }

    /// Keeps the selection on the same row ID, else back to the first row.
    fn resolve_selection(&mut self) {
        if let Some(id) = &self.tracked_id {
            match self.visible.find_index(id) {
                Some(idx) => self.selected = idx,
                None => self.selected = 0,
            }
        }
        if self.visible.is_empty() {
            self.selected = 0;
            self.tracked_id = None;
            return;
        }
        self.selected = self.selected.min(self.visible.len() - 1);
        self.tracked_id = Some(self.visible.rows[self.selected].row.id.clone());
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.tracked_id = None;
        self.resolve_selection();
    }

    // Filtering

    pub fn activate_filter(&mut self) {
        self.filter_active = true;
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_active
    }

    /// Leaves filter input, keeping the query.
    pub fn deactivate_filter(&mut self) {
        self.filter_active = false;
    }

    /// Appends a character to the live query. Returns false when not
    /// filtering.
    pub fn filter_input(&mut self, c: char) -> Result<bool, FilterError> {
        if !self.filter_active {
            return Ok(false);
        }
        let mut query = std::mem::take(&mut self.query);
        query.push(c);
        self.set_filter_query(query)?;
        Ok(true)
    }

    pub fn filter_delete(&mut self) -> Result<(), FilterError> {
        let mut query = std::mem::take(&mut self.query);
        query.pop();
        self.set_filter_query(query)
    }

    /// Replaces the live query and re-renders. An invalid expression
    /// reverts to the unfiltered view, clears the query and returns the
    /// error.
    pub fn set_filter_query(&mut self, query: impl Into<String>) -> Result<(), FilterError> {
        self.query = query.into();
        self.tracked_id = None;
        self.selected = 0;
        self.rebuild()
    }

    /// Drops the query and leaves filter input.
    pub fn clear_filter(&mut self) {
        self.query.clear();
        self.filter_active = false;
        self.refresh();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Trimmed selector when the query is a label query.
    pub fn label_selector(&self) -> Option<&str> {
        match Query::parse(&self.query) {
            Query::Label(sel) if !sel.is_empty() => Some(sel),
            _ => None,
        }
    }

    // Display modes

    pub fn toggle_wide(&mut self) {
        self.wide = !self.wide;
        self.refresh();
    }

    pub fn is_wide(&self) -> bool {
        self.wide
    }

    pub fn toggle_toast(&mut self) {
        self.toast = !self.toast;
        self.refresh();
    }

    pub fn reset_toast(&mut self) {
        self.toast = false;
        self.refresh();
    }

    pub fn is_toast(&self) -> bool {
        self.toast
    }

    /// Sorts by `name`; repeating the same column flips the direction.
    pub fn sort_col_cmd(&mut self, name: &str, default_asc: bool) {
        self.sort_col.toggle(name, default_asc);
        self.refresh();
    }

    pub fn invert_sort(&mut self) {
        self.sort_col.invert();
        self.refresh();
    }

    pub fn sort_col(&self) -> &SortColumn {
        &self.sort_col
    }

    /// True if the last pass substituted the sort column.
    pub fn sort_fell_back(&self) -> bool {
        self.sort_fallback
    }

    // Marks

    pub fn toggle_mark(&mut self) {
        let Some(id) = self.tracked_id.clone() else {
            return;
        };
        if !self.marks.remove(&id) {
            self.marks.insert(id);
        }
        self.refresh();
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
        self.refresh();
    }

    pub fn is_marked(&self, id: &str) -> bool {
        self.marks.contains(id)
    }

    /// Marked row IDs in snapshot order.
    pub fn marked(&self) -> Vec<&str> {
        self.data
            .ids()
            .into_iter()
            .filter(|id| self.marks.contains(*id))
            .collect()
    }

    // Navigation

    pub fn select_up(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn select_down(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    pub fn page_up(&mut self, n: usize) {
        self.select(self.selected.saturating_sub(n));
    }

    pub fn page_down(&mut self, n: usize) {
        self.select(self.selected.saturating_add(n));
    }

    pub fn home(&mut self) {
        self.select(0);
    }

    pub fn end(&mut self) {
        self.select(usize::MAX);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row_id(&self) -> Option<&str> {
        self.tracked_id.as_deref()
    }

    /// Selected snapshot row, looked up by ID.
    pub fn selected_row(&self) -> Option<&Row> {
        let id = self.tracked_id.as_deref()?;
        self.data.find(id).map(|re| &re.row)
    }

    // Output

    pub fn header_cells(&self) -> &[Cell] {
        &self.header_cells
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    pub fn plan(&self) -> &ColumnPlan {
        &self.plan
    }

    /// Rows on screen, filtered and sorted.
    pub fn visible(&self) -> &TableData {
        &self.visible
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn namespace(&self) -> &str {
        &self.data.namespace
    }

    /// True when rows from every namespace are shown.
    pub fn cluster_wide(&self) -> bool {
        scope::is_all_namespaces(&self.data.namespace)
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// `Kind(scope)[count]`, `Kind[count]` when cluster-scoped, plus
    /// ` </query>` while a query is set.
    pub fn title(&self) -> String {
        let base = title_case(&self.kind);
        let mut ns = self.data.namespace.as_str();
        if scope::is_all_namespaces(ns) {
            ns = NAMESPACE_ALL;
        }
        if let Some(path) = self.path.as_deref() {
            let (pns, name) = scope::namespaced(path);
            ns = if scope::is_cluster_scoped(pns) { name } else { path };
        }

        let count = self.visible.len();
        let mut title = if ns == CLUSTER_SCOPE {
            format!("{base}[{count}]")
        } else {
            format!("{base}({ns})[{count}]")
        };

        let buff = match Query::parse(&self.query) {
            Query::Empty => return title,
            Query::Label(sel) => sel,
            _ => self.query.as_str(),
        };
        title.push_str(&format!(" </{buff}>"));
        title
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl TableListener for TableController {
    fn table_data_changed(&mut self, data: TableData) {
        self.update(data);
    }

    fn table_load_failed(&mut self, err: &SourceError) {
        warn!(kind = %self.kind, error = %err, "table load failed");
        self.last_error = Some(err.to_string());
    }
}
