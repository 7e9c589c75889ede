//! Input abstraction layer.
//!
//! Normalizes host window events (GLFW-style button indices and key codes)
//! into a unified `InputEvent` enum consumed by the editor.

/// A mouse button, decoded from the host's button index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u32),
}

impl MouseButton {
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Middle,
            n => Self::Other(n),
        }
    }
}

/// The keys the editor reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Top-row digit `1`–`9` (or `0`).
    Digit(u8),
    Delete,
    Backspace,
    Enter,
    Escape,
    Other(i32),
}

impl Key {
    // GLFW key codes.
    const CODE_0: i32 = 48;
    const CODE_9: i32 = 57;
    const CODE_ESCAPE: i32 = 256;
    const CODE_ENTER: i32 = 257;
    const CODE_BACKSPACE: i32 = 259;
    const CODE_DELETE: i32 = 261;

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::CODE_0..=Self::CODE_9 => Self::Digit((code - Self::CODE_0) as u8),
            Self::CODE_ESCAPE => Self::Escape,
            Self::CODE_ENTER => Self::Enter,
            Self::CODE_BACKSPACE => Self::Backspace,
            Self::CODE_DELETE => Self::Delete,
            other => Self::Other(other),
        }
    }
}

/// A normalized input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to canvas position `(x, y)`.
    PointerMove { x: f64, y: f64 },

    /// Button pressed or released at the last pointer position.
    Button { button: MouseButton, pressed: bool },

    /// Key pressed or released.
    Key { key: Key, pressed: bool },

    /// Text input, already composed by the host.
    Char(char),

    /// The drawing surface changed size.
    Resize { width: f64, height: f64 },
}

impl InputEvent {
    /// Create a `Button` from a raw button index.
    pub fn from_button(index: u32, pressed: bool) -> Self {
        Self::Button {
            button: MouseButton::from_index(index),
            pressed,
        }
    }

    /// Create a `Key` from a raw key code.
    pub fn from_key(code: i32, pressed: bool) -> Self {
        Self::Key {
            key: Key::from_code(code),
            pressed,
        }
    }

    /// Create a `Char` from a Unicode scalar. Invalid scalars yield `None`.
    pub fn from_codepoint(codepoint: u32) -> Option<Self> {
        char::from_u32(codepoint).map(Self::Char)
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerMove { x, y } => Some((*x, *y)),
            _ => None,
        }
    }
}
