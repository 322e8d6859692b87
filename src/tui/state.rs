//! Application state owned by the UI loop.

use std::time::{Duration, Instant};

use ratatui::widgets::TableState as RatatuiTableState;

use crate::view::PortForwardDialog;

/// How long a flash message stays on screen.
pub const FLASH_TTL: Duration = Duration::from_secs(5);

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keystrokes edit the table query.
    Filter,
}

/// Active popup state. Only one popup can be open at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopupState {
    #[default]
    None,
    Help {
        scroll: usize,
    },
    QuitConfirm,
    PortForward(PortForwardDialog),
    /// Active tunnels list with the selected index.
    Tunnels {
        selected: usize,
    },
}

impl PopupState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Warn,
    Error,
}

/// One-line status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
    pub at: Instant,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub input_mode: InputMode,
    pub popup: PopupState,
    pub flash: Option<Flash>,
    pub ratatui_state: RatatuiTableState,
    /// Rows visible in the table area, used for paging.
    pub page_size: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            page_size: 10,
            ..Self::default()
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.set_flash(FlashLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.set_flash(FlashLevel::Warn, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.set_flash(FlashLevel::Error, message.into());
    }

    fn set_flash(&mut self, level: FlashLevel, message: String) {
        self.flash = Some(Flash {
            level,
            message,
            at: Instant::now(),
        });
    }

    /// Drops the flash message once it is older than [`FLASH_TTL`].
    pub fn expire_flash(&mut self, now: Instant) {
        if self
            .flash
            .as_ref()
            .is_some_and(|f| now.duration_since(f.at) >= FLASH_TTL)
        {
            self.flash = None;
        }
    }
}
