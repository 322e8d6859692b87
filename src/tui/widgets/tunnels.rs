//! Active port-forwards list.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState};

use super::popup_area;
use crate::tunnel::TunnelInfo;
use crate::tui::style::Styles;

/// Renders the tunnels popup. `selected` is clamped to the list.
pub fn render_tunnels(frame: &mut Frame, area: Rect, tunnels: &[TunnelInfo], selected: &mut usize) {
    let popup = popup_area(area, 96, tunnels.len() as u16 + 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" PortForwards[{}]  <d> stop  <esc> close ", tunnels.len()))
        .borders(Borders::ALL)
        .border_style(Styles::border());

    if tunnels.is_empty() {
        *selected = 0;
        let empty = Paragraph::new("No active port-forwards").style(Styles::dim());
        frame.render_widget(empty.block(block), popup);
        return;
    }
    *selected = (*selected).min(tunnels.len() - 1);

    let header = Row::new(["NAME", "CONTAINER", "ADDRESS", "PORTS", "STATE", "STARTED"])
        .style(Styles::table_header());
    let rows: Vec<Row> = tunnels
        .iter()
        .map(|t| {
            Row::new([
                t.id.path.clone(),
                t.id.container.clone(),
                t.spec.address.clone(),
                format!("{}:{}", t.spec.local_port, t.spec.remote_port),
                t.state.as_str().to_string(),
                t.started_at.format("%H:%M:%S").to_string(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(9),
    ];

    let mut state = TableState::default().with_selected(Some(*selected));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Styles::selected());
    frame.render_stateful_widget(table, popup, &mut state);
}
