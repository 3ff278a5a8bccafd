//! Browser keyboard event parsing.

use lighditor_core::Key;

/// Parse a W3C `KeyboardEvent.key` value.
pub fn parse_key(key: &str) -> Key {
    match key {
        "Enter" => Key::Enter,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Tab" => Key::Tab,
        "Escape" => Key::Escape,
        "ArrowLeft" => Key::ArrowLeft,
        "ArrowRight" => Key::ArrowRight,
        "ArrowUp" => Key::ArrowUp,
        "ArrowDown" => Key::ArrowDown,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "Alt" => Key::Alt,
        "AltGraph" => Key::AltGraph,
        "CapsLock" => Key::CapsLock,
        "Control" => Key::Control,
        "Meta" => Key::Meta,
        "Shift" => Key::Shift,
        // Single characters, including astral ones that are two UTF-16 units.
        s if s.chars().count() == 1 => Key::character(s),
        _ => Key::Unidentified,
    }
}

/// Key of a keyboard event.
pub fn key_from_event(event: &web_sys::KeyboardEvent) -> Key {
    parse_key(&event.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("Enter"), Key::Enter);
        assert_eq!(parse_key("Shift"), Key::Shift);
        assert_eq!(parse_key("a"), Key::character("a"));
        assert_eq!(parse_key("é"), Key::character("é"));
        assert_eq!(parse_key("😀"), Key::character("😀"));
        assert_eq!(parse_key("F5"), Key::Unidentified);
    }
}
