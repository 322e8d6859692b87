//! Terminal User Interface for kview.
//!
//! One UI thread owns the table state. Terminal input, refresh ticks and
//! tunnel lifecycle events all arrive through a single event queue.

mod app;
mod event;
mod input;
mod render;
mod state;
mod style;
mod widgets;

pub use app::App;
