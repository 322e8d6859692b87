//! Port-forward dialog.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::popup_area;
use crate::tui::style::Styles;
use crate::view::{DialogField, PortForwardDialog};

pub fn render_port_forward(frame: &mut Frame, area: Rect, dialog: &PortForwardDialog) {
    let height = dialog.candidates().len() as u16 + 9;
    let popup = popup_area(area, 64, height);
    frame.render_widget(Clear, popup);

    let label = |field: DialogField, text: &'static str| {
        if dialog.field() == field {
            Span::styled(text, Styles::key().add_modifier(Modifier::BOLD))
        } else {
            Span::styled(text, Styles::dim())
        }
    };

    let mut lines = vec![Line::from(label(DialogField::ContainerPort, "Container Port:"))];
    for (i, candidate) in dialog.candidates().iter().enumerate() {
        let marker = if i == dialog.selected() { "> " } else { "  " };
        let style = if i == dialog.selected() {
            Styles::selected()
        } else {
            Styles::default()
        };
        lines.push(Line::from(Span::styled(format!("{marker}{candidate}"), style)));
    }
    lines.push(Line::default());
    lines.push(Line::from(vec![
        label(DialogField::Address, "Address:    "),
        Span::raw(dialog.address().to_string()),
    ]));
    lines.push(Line::from(vec![
        label(DialogField::LocalPort, "Local Port: "),
        Span::raw(dialog.local_port().to_string()),
    ]));
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Tab", Styles::key()),
        Span::styled(" next field  ", Styles::dim()),
        Span::styled("Enter", Styles::key()),
        Span::styled(" OK  ", Styles::dim()),
        Span::styled("Esc", Styles::key()),
        Span::styled(" cancel", Styles::dim()),
    ]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" PortForward: {} ", dialog.path()))
            .borders(Borders::ALL)
            .border_style(Styles::border()),
    );
    frame.render_widget(paragraph, popup);
}
