//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use super::state::{AppState, PopupState};
use super::widgets::{
    render_header, render_help, render_menu, render_port_forward, render_prompt,
    render_quit_confirm, render_table, render_tunnels,
};
use crate::tunnel::TunnelInfo;
use crate::view::ResourceViewer;

/// What the frame shows besides the app state.
pub struct Screen<'a> {
    pub viewer: &'a dyn ResourceViewer,
    pub namespace: &'a str,
    pub tunnels: &'a [TunnelInfo],
}

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState, screen: &Screen<'_>) {
    let area = frame.area();
    let table = screen.viewer.table();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Menu hints
        Constraint::Min(3),    // Table
        Constraint::Length(1), // Prompt / flash
    ])
    .split(area);

    render_header(frame, chunks[0], screen.namespace, table.kind(), screen.tunnels.len());
    render_menu(frame, chunks[1], &screen.viewer.actions().hints());

    // Borders and the header row take three lines.
    state.page_size = chunks[2].height.saturating_sub(3).max(1) as usize;
    render_table(frame, chunks[2], table, &mut state.ratatui_state);
    render_prompt(frame, chunks[3], state, table.query());

    // Popups are rendered last to overlay everything.
    match &mut state.popup {
        PopupState::None => {}
        PopupState::Help { scroll } => {
            render_help(frame, area, &screen.viewer.actions().help(), scroll)
        }
        PopupState::QuitConfirm => render_quit_confirm(frame, area),
        PopupState::PortForward(dialog) => render_port_forward(frame, area, dialog),
        PopupState::Tunnels { selected } => render_tunnels(frame, area, screen.tunnels, selected),
    }
}
