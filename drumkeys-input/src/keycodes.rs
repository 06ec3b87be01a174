//! Terminal key events to platform key codes
//!
//! Codes follow the legacy DOM `keyCode` numbering on a US layout, so a
//! shifted character reports the code of the physical key it sits on.

use crossterm::event::{KeyCode as TermKey, KeyEvent, ModifierKeyCode};
use drumkeys_kit::KeyCode;

/// Key code for a terminal key event, if the key has one
pub fn key_code_for(event: &KeyEvent) -> Option<KeyCode> {
    let code = match event.code {
        TermKey::Char(c) => char_code(c)?,
        TermKey::Backspace => 8,
        TermKey::Tab | TermKey::BackTab => 9,
        TermKey::Enter => 13,
        TermKey::Pause => 19,
        TermKey::CapsLock => 20,
        TermKey::Esc => 27,
        TermKey::PageUp => 33,
        TermKey::PageDown => 34,
        TermKey::End => 35,
        TermKey::Home => 36,
        TermKey::Left => 37,
        TermKey::Up => 38,
        TermKey::Right => 39,
        TermKey::Down => 40,
        TermKey::Insert => 45,
        TermKey::Delete => 46,
        TermKey::Menu => 93,
        TermKey::F(n @ 1..=12) => 111 + u16::from(n),
        TermKey::NumLock => 144,
        TermKey::ScrollLock => 145,
        TermKey::Modifier(modifier) => modifier_code(modifier),
        _ => return None,
    };
    Some(KeyCode(code))
}

fn char_code(c: char) -> Option<u16> {
    let code = match c {
        'a'..='z' | 'A'..='Z' => c.to_ascii_uppercase() as u16,
        '0'..='9' => c as u16,
        ' ' => 32,
        // Shifted digit row
        ')' => 48,
        '!' => 49,
        '@' => 50,
        '#' => 51,
        '$' => 52,
        '%' => 53,
        '^' => 54,
        '&' => 55,
        '*' => 56,
        '(' => 57,
        ';' | ':' => 186,
        '=' | '+' => 187,
        ',' | '<' => 188,
        '-' | '_' => 189,
        '.' | '>' => 190,
        '/' | '?' => 191,
        '`' | '~' => 192,
        '[' | '{' => 219,
        '\\' | '|' => 220,
        ']' | '}' => 221,
        '\'' | '"' => 222,
        _ => return None,
    };
    Some(code)
}

fn modifier_code(modifier: ModifierKeyCode) -> u16 {
    match modifier {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => 16,
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => 17,
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => 18,
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => 92,
        _ => 91,
    }
}
