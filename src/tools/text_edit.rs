//! Inline text editing for text and speech bubble elements
//!
//! A session holds the working text and caret for one element. The engine
//! writes the buffer back into the element after every keystroke so the
//! element (and a bubble's box) track the text as it is typed.

use crate::input::{Key, KeyEvent, Named};
use crate::scene::ElementId;

/// What the engine should do after a key reached the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditAction {
    /// Buffer or caret changed; keep editing
    Changed,
    /// Key had no effect
    Ignored,
    /// Write the buffer back and close the session
    Commit,
    /// Restore the text the session started with and close
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEditSession {
    pub id: ElementId,
    original: String,
    buffer: String,
    /// Caret as a byte offset into `buffer`, always on a char boundary
    caret: usize,
    /// The element was placed for this session and is dropped if left empty
    fresh: bool,
}

impl TextEditSession {
    /// Open a session seeded with the element's current text, caret at the end
    pub fn new(id: ElementId, seed: &str, fresh: bool) -> Self {
        Self {
            id,
            original: seed.to_string(),
            buffer: seed.to_string(),
            caret: seed.len(),
            fresh,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.buffer.insert_str(self.caret, s);
        self.caret += s.len();
    }

    /// Delete the char before the caret
    pub fn backspace(&mut self) -> bool {
        let Some(c) = self.buffer[..self.caret].chars().next_back() else {
            return false;
        };
        self.caret -= c.len_utf8();
        self.buffer.remove(self.caret);
        true
    }

    /// Delete the char after the caret
    pub fn delete(&mut self) -> bool {
        if self.caret >= self.buffer.len() {
            return false;
        }
        self.buffer.remove(self.caret);
        true
    }

    pub fn move_left(&mut self) -> bool {
        match self.buffer[..self.caret].chars().next_back() {
            Some(c) => {
                self.caret -= c.len_utf8();
                true
            }
            None => false,
        }
    }

    pub fn move_right(&mut self) -> bool {
        match self.buffer[self.caret..].chars().next() {
            Some(c) => {
                self.caret += c.len_utf8();
                true
            }
            None => false,
        }
    }

    /// Caret to the start of the current line
    pub fn home(&mut self) -> bool {
        let start = self.buffer[..self.caret].rfind('\n').map_or(0, |i| i + 1);
        let moved = start != self.caret;
        self.caret = start;
        moved
    }

    /// Caret to the end of the current line
    pub fn end(&mut self) -> bool {
        let end = self.buffer[self.caret..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.caret + i);
        let moved = end != self.caret;
        self.caret = end;
        moved
    }

    /// Apply one key press
    pub fn handle_key(&mut self, event: &KeyEvent) -> EditAction {
        let changed = |did: bool| {
            if did {
                EditAction::Changed
            } else {
                EditAction::Ignored
            }
        };
        match event.key {
            // Shift+Enter breaks the line, Enter commits
            Key::Named(Named::Enter) if event.modifiers.shift() => {
                self.insert_char('\n');
                EditAction::Changed
            }
            Key::Named(Named::Enter) => EditAction::Commit,
            Key::Named(Named::Escape) => EditAction::Cancel,
            Key::Named(Named::Backspace) => changed(self.backspace()),
            Key::Named(Named::Delete) => changed(self.delete()),
            Key::Named(Named::ArrowLeft) => changed(self.move_left()),
            Key::Named(Named::ArrowRight) => changed(self.move_right()),
            Key::Named(Named::Home) => changed(self.home()),
            Key::Named(Named::End) => changed(self.end()),
            Key::Named(Named::Space) => {
                self.insert_char(' ');
                EditAction::Changed
            }
            Key::Named(Named::Tab) => EditAction::Ignored,
            Key::Character(_) if event.modifiers.control() => EditAction::Ignored,
            Key::Character(c) if c.is_control() => EditAction::Ignored,
            Key::Character(c) => {
                self.insert_char(c);
                EditAction::Changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::scene::ElementManager;

    fn session(seed: &str) -> TextEditSession {
        let id = ElementManager::new().allocate_id();
        TextEditSession::new(id, seed, false)
    }

    fn type_str(session: &mut TextEditSession, s: &str) {
        for c in s.chars() {
            session.handle_key(&KeyEvent::char(c));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut s = session("");
        type_str(&mut s, "héllo");
        assert_eq!(s.text(), "héllo");
        s.handle_key(&KeyEvent::named(Named::Backspace));
        s.handle_key(&KeyEvent::named(Named::ArrowLeft));
        s.handle_key(&KeyEvent::named(Named::ArrowLeft));
        s.handle_key(&KeyEvent::named(Named::Backspace));
        assert_eq!(s.text(), "hll");
    }

    #[test]
    fn test_enter_commits_shift_enter_breaks_line() {
        let mut s = session("one");
        let shift_enter = KeyEvent::new(Key::Named(Named::Enter), Modifiers::SHIFT);
        assert_eq!(s.handle_key(&shift_enter), EditAction::Changed);
        type_str(&mut s, "two");
        assert_eq!(s.text(), "one\ntwo");
        assert_eq!(
            s.handle_key(&KeyEvent::named(Named::Enter)),
            EditAction::Commit
        );
    }

    #[test]
    fn test_home_end_stay_on_current_line() {
        let mut s = session("ab\ncd");
        assert!(s.home());
        assert_eq!(s.caret(), 3);
        assert!(s.end());
        assert_eq!(s.caret(), 5);
        assert!(!s.end());
    }

    #[test]
    fn test_escape_cancels_and_keeps_original() {
        let mut s = session("keep");
        type_str(&mut s, "!!");
        assert_eq!(
            s.handle_key(&KeyEvent::named(Named::Escape)),
            EditAction::Cancel
        );
        assert_eq!(s.original(), "keep");
    }
}
