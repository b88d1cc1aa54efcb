// keybinds + field editing

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;

use crate::form::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Button,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Field(Field::RoomId) => Focus::Field(Field::Name),
            Focus::Field(Field::Name) => Focus::Button,
            Focus::Button => Focus::Field(Field::RoomId),
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Field(Field::RoomId) => Focus::Button,
            Focus::Field(Field::Name) => Focus::Field(Field::RoomId),
            Focus::Button => Focus::Field(Field::Name),
        }
    }

    pub fn field(self) -> Option<Field> {
        match self {
            Focus::Field(f) => Some(f),
            Focus::Button => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Insert(char),
    Backspace,
    FocusNext,
    FocusPrev,
    Submit,
    Cancel,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => Some(Action::Cancel),
        (KeyCode::Enter, _) => Some(Action::Submit),
        (KeyCode::Tab, _) | (KeyCode::Down, _) => Some(Action::FocusNext),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => Some(Action::FocusPrev),
        (KeyCode::Backspace, _) => Some(Action::Backspace),
        (KeyCode::Char(ch), KeyModifiers::NONE) | (KeyCode::Char(ch), KeyModifiers::SHIFT) => {
            Some(Action::Insert(ch))
        }
        _ => None,
    }
}

/// `value` with `ch` appended, or `None` once `max_chars` is reached.
pub fn push_capped(value: &str, ch: char, max_chars: usize) -> Option<String> {
    if value.chars().count() >= max_chars {
        return None;
    }
    let mut s = String::with_capacity(value.len() + ch.len_utf8());
    s.push_str(value);
    s.push(ch);
    Some(s)
}

/// Drops the last user-perceived character.
pub fn pop_grapheme(value: &str) -> String {
    match value.grapheme_indices(true).next_back() {
        Some((i, _)) => value[..i].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn maps_editing_and_submit() {
        assert_eq!(
            map_key(key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(Action::Insert('a'))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Action::Insert('A'))
        );
        assert_eq!(
            map_key(key(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(Action::Backspace)
        );
        assert_eq!(
            map_key(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(Action::Submit)
        );
    }

    #[test]
    fn maps_focus_and_cancel() {
        assert_eq!(map_key(key(KeyCode::Tab, KeyModifiers::NONE)), Some(Action::FocusNext));
        assert_eq!(map_key(key(KeyCode::Down, KeyModifiers::NONE)), Some(Action::FocusNext));
        assert_eq!(map_key(key(KeyCode::BackTab, KeyModifiers::SHIFT)), Some(Action::FocusPrev));
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Action::Cancel));
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Cancel)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::ALT)), None);
    }

    #[test]
    fn ignores_key_release() {
        let mut ev = key(KeyCode::Char('a'), KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(map_key(ev), None);
    }

    #[test]
    fn focus_cycles_both_ways() {
        let start = Focus::Field(Field::RoomId);
        assert_eq!(start.next(), Focus::Field(Field::Name));
        assert_eq!(start.next().next(), Focus::Button);
        assert_eq!(start.next().next().next(), start);
        assert_eq!(start.prev(), Focus::Button);
        assert_eq!(Focus::Button.field(), None);
    }

    #[test]
    fn push_respects_cap() {
        assert_eq!(push_capped("ab", 'c', 3), Some("abc".into()));
        assert_eq!(push_capped("abc", 'd', 3), None);
        assert_eq!(push_capped("ééé", 'x', 4), Some("éééx".into()));
    }

    #[test]
    fn pop_removes_whole_grapheme() {
        assert_eq!(pop_grapheme("abc"), "ab");
        assert_eq!(pop_grapheme(""), "");
        assert_eq!(pop_grapheme("ne\u{301}"), "n");
        assert_eq!(pop_grapheme("hi👋🏽"), "hi");
    }
}
