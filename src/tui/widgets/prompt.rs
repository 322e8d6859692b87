//! Bottom line: the filter prompt while typing, the flash message otherwise.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::{AppState, InputMode};
use crate::tui::style::Styles;

pub fn render_prompt(frame: &mut Frame, area: Rect, state: &AppState, query: &str) {
    let line = if state.input_mode == InputMode::Filter {
        Line::from(vec![
            Span::styled("/", Styles::key()),
            Span::raw(query.to_string()),
            Span::styled("_", Styles::dim()),
        ])
    } else if let Some(flash) = &state.flash {
        Line::from(Span::styled(flash.message.clone(), Styles::flash(flash.level)))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}
