//! Header bar and menu hints line.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::style::Styles;

/// Renders the top bar: app name, scope, active tunnels and the clock.
pub fn render_header(frame: &mut Frame, area: Rect, namespace: &str, kind: &str, tunnels: usize) {
    let line = Line::from(vec![
        Span::styled(" kview ", Styles::header()),
        Span::raw(format!(" ns: {namespace} ")),
        Span::raw(format!(" view: {kind} ")),
        Span::raw(format!(" port-forwards: {tunnels} ")),
        Span::styled(format!(" {} ", Local::now().format("%H:%M:%S")), Styles::dim()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Renders `<key> description` pairs for the visible actions.
pub fn render_menu(frame: &mut Frame, area: Rect, hints: &[(String, String)]) {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, description) in hints {
        spans.push(Span::styled(key.clone(), Styles::key()));
        spans.push(Span::styled(format!(" {description}  "), Styles::dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
