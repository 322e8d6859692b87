//! Input handling and keybindings.
//!
//! Navigation, prompts and popups are handled here. Everything else is
//! forwarded to the active view as a [`KeyBinding`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::state::{AppState, InputMode, PopupState};
use crate::table::TableController;
use crate::view::KeyBinding;

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Run the view action bound to this key.
    Dispatch(KeyBinding),
    /// The query changed; `commit` is set once input is confirmed.
    FilterChanged { commit: bool },
    /// Start the tunnel described by the open dialog.
    StartForward,
    /// Stop the tunnel at this index of the tunnels list.
    StopTunnel(usize),
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, table: &mut TableController, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    match state.popup {
        PopupState::None => {}
        PopupState::QuitConfirm => return handle_quit_confirm(state, key),
        PopupState::Help { .. } => return handle_help(state, key),
        PopupState::PortForward(_) => return handle_port_forward(state, key),
        PopupState::Tunnels { .. } => return handle_tunnels(state, key),
    }
    match state.input_mode {
        InputMode::Normal => handle_normal_mode(state, table, key),
        InputMode::Filter => handle_filter_mode(state, table, key),
    }
}

fn handle_quit_confirm(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('y') => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Esc | KeyCode::Char('n') => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn handle_help(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let PopupState::Help { scroll } = &mut state.popup else {
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') => state.popup = PopupState::None,
        KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
        _ => {}
    }
    KeyAction::None
}

fn handle_port_forward(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let PopupState::PortForward(dialog) = &mut state.popup else {
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc => state.popup = PopupState::None,
        KeyCode::Enter => return KeyAction::StartForward,
        KeyCode::Tab => dialog.next_field(),
        KeyCode::Up => dialog.select_up(),
        KeyCode::Down => dialog.select_down(),
        KeyCode::Backspace => dialog.backspace(),
        KeyCode::Char(c) => dialog.input(c),
        _ => {}
    }
    KeyAction::None
}

fn handle_tunnels(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let PopupState::Tunnels { selected } = &mut state.popup else {
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('f') => state.popup = PopupState::None,
        KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
        // Clamped against the registry when drawn.
        KeyCode::Down | KeyCode::Char('j') => *selected = selected.saturating_add(1),
        KeyCode::Char('d') => return KeyAction::StopTunnel(*selected),
        _ => {}
    }
    KeyAction::None
}

/// Handles keys in normal mode.
fn handle_normal_mode(state: &mut AppState, table: &mut TableController, key: KeyEvent) -> KeyAction {
    let page = state.page_size.max(1);
    match key.code {
        KeyCode::Char('q') => state.popup = PopupState::QuitConfirm,
        KeyCode::Char('?') => state.popup = PopupState::Help { scroll: 0 },

        KeyCode::Up | KeyCode::Char('k') => table.select_up(),
        KeyCode::Down | KeyCode::Char('j') => table.select_down(),
        KeyCode::PageUp => table.page_up(page),
        KeyCode::PageDown => table.page_down(page),
        KeyCode::Char('b') if key.modifiers.contains(KeyModifiers::CONTROL) => table.page_up(page),
        KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            table.page_down(page)
        }
        KeyCode::Home | KeyCode::Char('g') => table.home(),
        KeyCode::End | KeyCode::Char('G') => table.end(),

        KeyCode::Esc if !table.query().is_empty() => {
            table.clear_filter();
            return KeyAction::FilterChanged { commit: true };
        }
        KeyCode::Esc => {}

        _ => {
            let binding = KeyBinding::from(key);
            debug!(key = %binding, "dispatching to view");
            return KeyAction::Dispatch(binding);
        }
    }
    KeyAction::None
}

fn handle_filter_mode(state: &mut AppState, table: &mut TableController, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
            table.clear_filter();
            KeyAction::FilterChanged { commit: true }
        }
        KeyCode::Enter => {
            state.input_mode = InputMode::Normal;
            table.deactivate_filter();
            KeyAction::FilterChanged { commit: true }
        }
        KeyCode::Backspace => {
            // Errors are kept by the controller and flashed by the app.
            let _ = table.filter_delete();
            KeyAction::FilterChanged { commit: false }
        }
        KeyCode::Char(c) => {
            let _ = table.filter_input(c);
            KeyAction::FilterChanged { commit: false }
        }
        _ => KeyAction::None,
    }
}
