//! Host input events and keyboard shortcut mapping

use serde::{Deserialize, Serialize};

use crate::domain::Point;
use crate::tools::ToolKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        shift: true,
        alt: false,
    };

    pub fn control(&self) -> bool {
        self.ctrl
    }

    pub fn shift(&self) -> bool {
        self.shift
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    DoubleClick,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// One pointer event in viewport (window) coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    #[serde(default)]
    pub button: PointerButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }

    pub fn double_click(x: f32, y: f32) -> Self {
        Self::new(PointerKind::DoubleClick, x, y)
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// Scroll wheel notch; positive `delta` scrolls up (zoom in with Ctrl)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: f32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Named {
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Character(char),
    Named(Named),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Character(c), Modifiers::NONE)
    }

    pub fn named(named: Named) -> Self {
        Self::new(Key::Named(named), Modifiers::NONE)
    }
}

/// Engine action bound to a key outside of text editing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    DeleteSelected,
    Duplicate,
    BringToFront,
    SendToBack,
    Cancel,
    SelectTool(ToolKind),
}

/// Map a key press to an engine shortcut
///
/// Not consulted while a text edit session is open; those keys belong to
/// the session.
pub fn shortcut_for(event: &KeyEvent) -> Option<Shortcut> {
    let modifiers = event.modifiers;
    match event.key {
        // Undo/redo shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case(&'z') && modifiers.control() && !modifiers.shift() => {
            Some(Shortcut::Undo)
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case(&'y') && modifiers.control())
                || (c.eq_ignore_ascii_case(&'z') && modifiers.control() && modifiers.shift()) =>
        {
            Some(Shortcut::Redo)
        }
        Key::Character(c) if c.eq_ignore_ascii_case(&'d') && modifiers.control() => {
            Some(Shortcut::Duplicate)
        }
        // Ctrl+] / Ctrl+[ reorder the selection
        Key::Character(']') if modifiers.control() => Some(Shortcut::BringToFront),
        Key::Character('[') if modifiers.control() => Some(Shortcut::SendToBack),
        Key::Named(Named::Delete) | Key::Named(Named::Backspace) => Some(Shortcut::DeleteSelected),
        Key::Named(Named::Escape) => Some(Shortcut::Cancel),
        // Single letters pick tools
        Key::Character(c) if !modifiers.control() && !modifiers.alt => {
            ToolKind::from_key(c).map(Shortcut::SelectTool)
        }
        _ => None,
    }
}
