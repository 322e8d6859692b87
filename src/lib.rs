//! kview - a live resource table engine with port-forward tunnels.
//!
//! The table engine ([`table`]) filters, sorts, customizes and renders
//! snapshots produced by a [`source::DataSource`]. The [`tunnel`] registry
//! runs port-forwards on background sessions, and [`view`] binds keys on
//! the selected row to both. [`tui`] is the terminal front-end used by the
//! `kview` binary.

pub mod config;
pub mod export;
pub mod model;
pub mod source;
pub mod table;
pub mod tui;
pub mod tunnel;
pub mod util;
pub mod view;
