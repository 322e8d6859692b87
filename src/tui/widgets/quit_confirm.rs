//! Quit confirmation popup.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::popup_area;
use crate::tui::style::Styles;

pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 36, 5);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from("Quit kview?"),
        Line::from(vec![
            Span::styled("Enter", Styles::key()),
            Span::raw(" yes  "),
            Span::styled("Esc", Styles::key()),
            Span::raw(" no"),
        ]),
    ];
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Styles::border()),
    );
    frame.render_widget(paragraph, popup);
}
