//! TUI widgets for kview.

mod header;
mod help;
mod port_forward;
mod prompt;
mod quit_confirm;
mod table;
mod tunnels;

pub use header::{render_header, render_menu};
pub use help::render_help;
pub use port_forward::render_port_forward;
pub use prompt::render_prompt;
pub use quit_confirm::render_quit_confirm;
pub use table::render_table;
pub use tunnels::render_tunnels;

use ratatui::layout::Rect;

/// Centered popup of at most `width` x `height` cells, kept two cells
/// inside `area` on every side.
pub(crate) fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(popup_area(area, 60, 20), Rect::new(20, 10, 60, 20));
        assert_eq!(popup_area(Rect::new(0, 0, 30, 10), 60, 20), Rect::new(2, 2, 26, 6));
    }
}
