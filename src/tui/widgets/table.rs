//! Resource table widget.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell as TuiCell, Row, Table, TableState};

use crate::model::Align;
use crate::table::{Cell, TableController};
use crate::tui::style::Styles;

/// Renders the visible grid of `table` with its title and sort indicator.
pub fn render_table(
    frame: &mut Frame,
    area: Rect,
    table: &TableController,
    ratatui_state: &mut TableState,
) {
    ratatui_state.select(if table.grid().is_empty() {
        None
    } else {
        Some(table.selected())
    });

    let header = Row::new(table.header_cells().iter().map(cell))
        .style(Styles::table_header())
        .height(1);

    let rows: Vec<Row> = table
        .grid()
        .iter()
        .map(|cells| {
            let style = cells
                .first()
                .map(|c| Styles::row(c.color))
                .unwrap_or_else(Styles::default);
            Row::new(cells.iter().map(cell)).style(style).height(1)
        })
        .collect();

    let table_widget = Table::new(rows, column_widths(table))
        .header(header)
        .column_spacing(2)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border())
                .title(format!(" {} ", table.title())),
        )
        .row_highlight_style(Styles::selected());

    frame.render_stateful_widget(table_widget, area, ratatui_state);
}

fn cell(c: &Cell) -> TuiCell<'static> {
    let alignment = match c.align {
        Align::Left => Alignment::Left,
        Align::Right => Alignment::Right,
        Align::Center => Alignment::Center,
    };
    TuiCell::from(Line::from(c.text.clone()).alignment(alignment))
}

/// Widest of header and cell text per column.
fn column_widths(table: &TableController) -> Vec<Constraint> {
    let mut widths: Vec<usize> = table
        .header_cells()
        .iter()
        .map(|c| c.text.chars().count())
        .collect();
    for row in table.grid() {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.text.trim_end().chars().count());
        }
    }
    widths
        .into_iter()
        .map(|w| Constraint::Length(w as u16))
        .collect()
}
