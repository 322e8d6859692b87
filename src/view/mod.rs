//! Resource views: key bindings over a [`TableController`].
//!
//! A [`ResourceViewer`] exposes the selected row and the app context to its
//! key actions. [`Browser`] is the base viewer every kind gets; extenders
//! such as [`PortForwardExtender`] wrap a viewer and add their own bindings.

mod actions;
mod browser;
mod hotkeys;
mod port_forward;

pub use actions::{Action, BoundAction, KeyActions, KeyBinding};
pub use browser::Browser;
pub use hotkeys::hotkey_actions;
pub use port_forward::{DialogField, PortForwardDialog, PortForwardExtender, start_forward};

use std::io;

use crate::config::Config;
use crate::source::{DataSource, POD_KIND, SourceError};
use crate::table::TableController;
use crate::tunnel::TunnelError;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("invalid key binding {0:?}")]
    InvalidKey(String),
    #[error("port-forward is not supported on {0}")]
    NotForwardable(String),
    #[error("invalid local port {0:?}")]
    InvalidPort(String),
    #[error("local address must not be empty")]
    EmptyAddress,
    #[error("dump failed: {0}")]
    Export(#[source] io::Error),
    #[error(transparent)]
    Tunnel(#[from] TunnelError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Shared services handed to key actions.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub source: &'a dyn DataSource,
    pub config: &'a Config,
}

/// What the app should do after an action ran.
#[derive(Debug, PartialEq)]
pub enum ViewOutcome {
    Done,
    /// Report a message on the flash line.
    Flash(String),
    /// Route keystrokes to the filter prompt.
    StartFilter,
    ShowTunnels,
    OpenPortForward(PortForwardDialog),
    Goto(String),
}

/// Base capability of a view: its table, its key actions and a handler.
pub trait ResourceViewer {
    fn table(&self) -> &TableController;
    fn table_mut(&mut self) -> &mut TableController;
    fn actions(&self) -> &KeyActions;
    fn actions_mut(&mut self) -> &mut KeyActions;

    /// Rebinds actions that depend on the table state, e.g. the namespace
    /// sort shortcut which only exists while every namespace is shown.
    fn refresh_actions(&mut self);

    fn handle(&mut self, action: &Action, ctx: &ViewContext<'_>)
    -> Result<ViewOutcome, ViewError>;

    fn kind(&self) -> &str {
        self.table().kind()
    }

    /// Runs the action bound to `key`, if any.
    fn dispatch(
        &mut self,
        key: KeyBinding,
        ctx: &ViewContext<'_>,
    ) -> Option<Result<ViewOutcome, ViewError>> {
        let action = self.actions().get(&key)?.action.clone();
        Some(self.handle(&action, ctx))
    }
}

/// Builds the viewer for `kind`, with hotkeys bound.
pub fn viewer_for(kind: &str, config: &Config) -> Box<dyn ResourceViewer> {
    let browser = Browser::new(kind, config);
    let mut viewer: Box<dyn ResourceViewer> = if kind == POD_KIND {
        Box::new(PortForwardExtender::new(browser))
    } else {
        Box::new(browser)
    };
    hotkey_actions(config, viewer.actions_mut());
    viewer
}
