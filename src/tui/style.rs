//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

use super::state::FlashLevel;
use crate::table::RowColor;

/// Color palette.
pub struct Theme;

impl Theme {
    // Background colors
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;
    pub const SELECTED_BG: Color = Color::DarkGray;

    // Foreground colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;
    pub const KEY_FG: Color = Color::Yellow;

    // Row colors
    pub const ROW_ADDED: Color = Color::LightBlue;
    pub const ROW_MODIFIED: Color = Color::Yellow;
    pub const ROW_PENDING: Color = Color::DarkGray;
    pub const ROW_COMPLETED: Color = Color::Gray;
    pub const ROW_ERROR: Color = Color::Red;
    pub const ROW_MARKED: Color = Color::LightCyan;

    // Flash colors
    pub const FLASH_INFO: Color = Color::Green;
    pub const FLASH_WARN: Color = Color::Yellow;
    pub const FLASH_ERROR: Color = Color::Red;

    pub const BORDER: Color = Color::Cyan;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Header bar style.
    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected row style.
    pub fn selected() -> Style {
        Style::default()
            .bg(Theme::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Table header style.
    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .add_modifier(Modifier::BOLD)
    }

    /// Dimmed text style.
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Key name in menu hints.
    pub fn key() -> Style {
        Style::default().fg(Theme::KEY_FG)
    }

    pub fn border() -> Style {
        Style::default().fg(Theme::BORDER)
    }

    /// Row style for a rendered color class.
    pub fn row(color: RowColor) -> Style {
        let fg = match color {
            RowColor::Std => return Self::default(),
            RowColor::Added => Theme::ROW_ADDED,
            RowColor::Modified => Theme::ROW_MODIFIED,
            RowColor::Pending => Theme::ROW_PENDING,
            RowColor::Completed => Theme::ROW_COMPLETED,
            RowColor::Error => Theme::ROW_ERROR,
            RowColor::Marked => Theme::ROW_MARKED,
        };
        let style = Style::default().fg(fg);
        if color == RowColor::Marked {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn flash(level: FlashLevel) -> Style {
        let fg = match level {
            FlashLevel::Info => Theme::FLASH_INFO,
            FlashLevel::Warn => Theme::FLASH_WARN,
            FlashLevel::Error => Theme::FLASH_ERROR,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }
}
