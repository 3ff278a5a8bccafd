//! Platform-neutral keys and keydown results.
//!
//! The controller only cares about a handful of distinctions: structural keys
//! it handles itself, navigation keys that move the selection, modifier keys
//! that change nothing, and everything else that lets the host edit the tree.

use smol_str::SmolStr;

/// A key, named after the W3C `KeyboardEvent.key` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    AltGraph,
    CapsLock,
    Control,
    Meta,
    Shift,
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Key::Character(s.into())
    }

    /// Keys that only move the caret or selection.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::ArrowLeft
                | Key::ArrowRight
                | Key::ArrowUp
                | Key::ArrowDown
                | Key::Home
                | Key::End
                | Key::PageUp
                | Key::PageDown
        )
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::Alt | Key::AltGraph | Key::CapsLock | Key::Control | Key::Meta | Key::Shift
        )
    }

    /// Keys whose native handling restructures rows differently per host.
    pub fn is_structural(&self) -> bool {
        matches!(self, Key::Enter | Key::Backspace | Key::Delete)
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Let the host apply its native edit; it is read back on keyup.
    PassThrough,
}

impl KeydownResult {
    pub fn prevent_default(&self) -> bool {
        matches!(self, KeydownResult::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_classes() {
        assert!(Key::ArrowUp.is_navigation());
        assert!(!Key::ArrowUp.is_structural());
        assert!(Key::Enter.is_structural());
        assert!(Key::Shift.is_modifier());
        assert!(!Key::character("a").is_navigation());
        assert!(!Key::character("a").is_modifier());
        assert!(KeydownResult::Handled.prevent_default());
        assert!(!KeydownResult::PassThrough.prevent_default());
    }
}
