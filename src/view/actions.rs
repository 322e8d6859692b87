//! Key bindings and the actions they trigger.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::ViewError;

/// A key plus modifiers, normalized so that `Shift+f` and `F` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        // Terminals disagree on whether an uppercase letter carries SHIFT.
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn shift(c: char) -> Self {
        Self::char(c.to_ascii_uppercase())
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Parses `a`, `Shift-F`, `Ctrl-s`, `Alt-x` or `F1`..`F12`.
    pub fn parse(s: &str) -> Result<Self, ViewError> {
        let invalid = || ViewError::InvalidKey(s.to_string());

        let mut modifiers = KeyModifiers::NONE;
        let mut parts: Vec<&str> = s.trim().split('-').collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;
        for m in parts {
            match m.to_ascii_lowercase().as_str() {
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return Err(invalid()),
            }
        }

        let mut chars = key.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => {
                if modifiers.contains(KeyModifiers::SHIFT) && c.is_ascii_alphabetic() {
                    KeyCode::Char(c.to_ascii_uppercase())
                } else {
                    KeyCode::Char(c)
                }
            }
            _ => match key.to_ascii_lowercase().as_str() {
                "enter" => KeyCode::Enter,
                "esc" => KeyCode::Esc,
                "tab" => KeyCode::Tab,
                "space" => KeyCode::Char(' '),
                f if f.starts_with('f') => {
                    let n: u8 = f[1..].parse().map_err(|_| invalid())?;
                    if !(1..=12).contains(&n) {
                        return Err(invalid());
                    }
                    KeyCode::F(n)
                }
                _ => return Err(invalid()),
            },
        };
        Ok(Self::new(code, modifiers))
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(key: KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefix = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            prefix.push_str("ctrl-");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            prefix.push_str("alt-");
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "<{prefix}space>"),
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                write!(f, "<{prefix}shift-{}>", c.to_ascii_lowercase())
            }
            KeyCode::Char(c) => write!(f, "<{prefix}{c}>"),
            KeyCode::F(n) => write!(f, "<{prefix}f{n}>"),
            KeyCode::Enter => write!(f, "<{prefix}enter>"),
            KeyCode::Esc => write!(f, "<{prefix}esc>"),
            KeyCode::Tab => write!(f, "<{prefix}tab>"),
            other => write!(f, "<{prefix}{other:?}>"),
        }
    }
}

/// What a bound key does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SortColumn { name: String, asc: bool },
    InvertSort,
    ToggleWide,
    ToggleToast,
    ToggleMark,
    ClearMarks,
    Filter,
    PortForward,
    ShowTunnels,
    Dump,
    /// Switch the view to another resource kind.
    GotoKind(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAction {
    pub description: String,
    pub action: Action,
    /// Shown in the menu hints.
    pub visible: bool,
}

impl BoundAction {
    pub fn new(description: impl Into<String>, action: Action, visible: bool) -> Self {
        Self {
            description: description.into(),
            action,
            visible,
        }
    }
}

/// Dispatch table of a view.
#[derive(Debug, Clone, Default)]
pub struct KeyActions(HashMap<KeyBinding, BoundAction>);

impl KeyActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key`, replacing any previous binding.
    pub fn add(&mut self, key: KeyBinding, action: BoundAction) {
        self.0.insert(key, action);
    }

    pub fn add_all(&mut self, other: KeyActions) {
        self.0.extend(other.0);
    }

    pub fn delete(&mut self, key: &KeyBinding) -> Option<BoundAction> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &KeyBinding) -> Option<&BoundAction> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &KeyBinding) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Visible bindings as `(key, description)`, ordered by description.
    pub fn hints(&self) -> Vec<(String, String)> {
        self.describe(|a| a.visible)
    }

    /// Every binding, hidden ones included.
    pub fn help(&self) -> Vec<(String, String)> {
        self.describe(|_| true)
    }

    fn describe(&self, keep: impl Fn(&BoundAction) -> bool) -> Vec<(String, String)> {
        let mut hints: Vec<_> = self
            .0
            .iter()
            .filter(|(_, a)| keep(a))
            .map(|(k, a)| (k.to_string(), a.description.clone()))
            .collect();
        hints.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_is_normalized() {
        let raw = KeyBinding::from(KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT));
        assert_eq!(raw, KeyBinding::shift('f'));
        assert_eq!(raw, KeyBinding::char('F'));
        assert_ne!(raw, KeyBinding::char('f'));
    }

    #[test]
    fn parses_bindings() {
        assert_eq!(KeyBinding::parse("Shift-f").unwrap(), KeyBinding::shift('f'));
        assert_eq!(KeyBinding::parse("Ctrl-s").unwrap(), KeyBinding::ctrl('s'));
        assert_eq!(KeyBinding::parse("x").unwrap(), KeyBinding::char('x'));
        assert_eq!(
            KeyBinding::parse("F2").unwrap(),
            KeyBinding::new(KeyCode::F(2), KeyModifiers::NONE)
        );
        assert_eq!(KeyBinding::parse("space").unwrap(), KeyBinding::char(' '));

        assert!(KeyBinding::parse("").is_err());
        assert!(KeyBinding::parse("Hyper-x").is_err());
        assert!(KeyBinding::parse("F13").is_err());
        assert!(KeyBinding::parse("abc").is_err());
    }

    #[test]
    fn displays_bindings() {
        assert_eq!(KeyBinding::shift('f').to_string(), "<shift-f>");
        assert_eq!(KeyBinding::ctrl('w').to_string(), "<ctrl-w>");
        assert_eq!(KeyBinding::char('/').to_string(), "</>");
        assert_eq!(KeyBinding::char(' ').to_string(), "<space>");
    }

    #[test]
    fn hints_skip_hidden_actions() {
        let mut actions = KeyActions::new();
        actions.add(
            KeyBinding::char('w'),
            BoundAction::new("Wide", Action::ToggleWide, true),
        );
        actions.add(
            KeyBinding::char('z'),
            BoundAction::new("Toast", Action::ToggleToast, false),
        );
        actions.add(
            KeyBinding::shift('i'),
            BoundAction::new("Invert", Action::InvertSort, true),
        );

        assert_eq!(
            actions.hints(),
            vec![
                ("<shift-i>".to_string(), "Invert".to_string()),
                ("<w>".to_string(), "Wide".to_string()),
            ]
        );
    }

    #[test]
    fn add_replaces_and_delete_removes() {
        let mut actions = KeyActions::new();
        let key = KeyBinding::char('d');
        actions.add(key, BoundAction::new("Dump", Action::Dump, true));
        actions.add(key, BoundAction::new("Mark", Action::ToggleMark, true));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions.get(&key).unwrap().action, Action::ToggleMark);

        assert!(actions.delete(&key).is_some());
        assert!(actions.is_empty());
    }
}
