use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::BOLT_PALETTE;

pub(super) fn command_char(key: KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }
    if let KeyCode::Char(ch) = key.code {
        Some(ch.to_ascii_lowercase())
    } else {
        None
    }
}

fn command_char_matches_keycode(code: KeyCode, target: char) -> bool {
    matches!(code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&target))
}

pub(super) fn settings_close_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Esc | KeyCode::Enter)
        || command_char_matches_keycode(code, 's')
        || command_char_matches_keycode(code, 'q')
}

/// `'1'..` picks the matching palette entry.
pub(super) fn palette_digit(ch: char) -> Option<usize> {
    let index = ch.to_digit(10)?.checked_sub(1)? as usize;
    (index < BOLT_PALETTE.len()).then_some(index)
}
