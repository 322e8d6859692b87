//! Help popup: global keys plus the active view's bindings.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::table::{FUZZY_PREFIX, LABEL_PREFIX};

const GLOBAL_KEYS: &[(&str, &str)] = &[
    ("↑/k ↓/j", "move selection"),
    ("PgUp/PgDn", "page up/down"),
    ("g/G", "first/last row"),
    ("Esc", "clear filter, close popup"),
    ("?", "toggle help"),
    ("q", "quit"),
];

/// Renders the help popup centered on screen with scroll support.
pub fn render_help(frame: &mut Frame, area: Rect, hints: &[(String, String)], scroll: &mut usize) {
    // 60% width, 80% height, clamped to 40-80 x 10-30
    let popup_width = (area.width * 60 / 100).clamp(40, 80).min(area.width);
    let popup_height = (area.height * 80 / 100).clamp(10, 30).min(area.height);
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let content = help_lines(hints);
    let content_lines = content.len();

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

    let visible_height = chunks[0].height as usize;
    let max_scroll = content_lines.saturating_sub(visible_height);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((*scroll as u16, 0))
        .style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, chunks[0]);

    let scroll_info = if max_scroll > 0 {
        format!(" [{}/{}]", *scroll + 1, max_scroll + 1)
    } else {
        String::new()
    };
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::styled(" to close, ", Style::default().fg(Color::DarkGray)),
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::styled(" to scroll", Style::default().fg(Color::DarkGray)),
        Span::styled(scroll_info, Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(footer, chunks[1]);
}

fn help_lines(hints: &[(String, String)]) -> Vec<Line<'static>> {
    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    };
    let entry = |key: String, description: String| {
        Line::from(vec![
            Span::styled(format!("{key:<14}"), Style::default().fg(Color::Cyan)),
            Span::raw(description),
        ])
    };

    let mut lines = vec![section("General")];
    lines.extend(
        GLOBAL_KEYS
            .iter()
            .map(|(k, d)| entry(k.to_string(), d.to_string())),
    );
    lines.push(Line::from(""));

    lines.push(section("View"));
    lines.extend(hints.iter().map(|(k, d)| entry(k.clone(), d.clone())));
    lines.push(Line::from(""));

    lines.push(section("Filter"));
    lines.extend([
        entry("<text>".into(), "case-insensitive regex over all columns".into()),
        entry(format!("{LABEL_PREFIX} k=v"), "label selector".into()),
        entry(format!("{FUZZY_PREFIX} text"), "fuzzy match on names".into()),
    ]);
    lines
}
