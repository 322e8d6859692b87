//! Configured hotkeys that jump between resource kinds.

use tracing::warn;

use super::actions::{Action, BoundAction, KeyActions, KeyBinding};
use crate::config::Config;

/// Binds the hotkeys of `config` into `actions`.
///
/// Invalid shortcuts and shortcuts that collide with an existing binding
/// are skipped with a warning.
pub fn hotkey_actions(config: &Config, actions: &mut KeyActions) {
    for (name, hk) in &config.hotkeys {
        let key = match KeyBinding::parse(&hk.shortcut) {
            Ok(key) => key,
            Err(e) => {
                warn!(hotkey = %name, error = %e, "unable to map hotkey shortcut");
                continue;
            }
        };
        if actions.contains(&key) {
            warn!(hotkey = %name, shortcut = %hk.shortcut, "duplicate hotkey found, skipping");
            continue;
        }
        let description = if hk.description.is_empty() {
            name.clone()
        } else {
            hk.description.clone()
        };
        actions.add(
            key,
            BoundAction::new(description, Action::GotoKind(hk.command.clone()), true),
        );
    }
}
