//! Input abstraction layer.
//!
//! Normalizes pointer and keyboard events from the host UI into a
//! unified `InputEvent` enum consumed by the editor and its states.
//! Pointer coordinates arrive in screen space; the editor converts them
//! to page space before any state sees them.

/// Held modifier keys. `cmd` is ⌘ on macOS and Ctrl elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub cmd: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        cmd: false,
        shift: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        cmd: false,
        shift: true,
        alt: false,
    };

    pub const CMD: Self = Self {
        cmd: true,
        shift: false,
        alt: false,
    };

    /// Fold raw browser/OS flags: either Ctrl or Meta counts as cmd.
    pub fn from_raw(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        Self {
            cmd: ctrl || meta,
            shift,
            alt,
        }
    }
}

/// One key press, as delivered by the host (`KeyboardEvent.key` naming).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn cmd(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::CMD)
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pencil contact).
    PointerDown { x: f32, y: f32, modifiers: Modifiers },

    PointerMove { x: f32, y: f32, modifiers: Modifiers },

    PointerUp { x: f32, y: f32, modifiers: Modifiers },

    /// Scroll / pinch-zoom.
    Scroll {
        dx: f32,
        dy: f32,
        /// Zoom factor (1.0 = no change; >1 = zoom in).
        zoom: f32,
    },

    Key(KeyPress),
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key(KeyPress::new(key, modifiers))
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. } => *modifiers,
            Self::Key(press) => press.modifiers,
            Self::Scroll { .. } => Modifiers::NONE,
        }
    }

    /// Same event with its pointer position replaced.
    #[must_use]
    pub fn with_position(&self, nx: f32, ny: f32) -> Self {
        match self.clone() {
            Self::PointerDown { modifiers, .. } => Self::PointerDown {
                x: nx,
                y: ny,
                modifiers,
            },
            Self::PointerMove { modifiers, .. } => Self::PointerMove {
                x: nx,
                y: ny,
                modifiers,
            },
            Self::PointerUp { modifiers, .. } => Self::PointerUp {
                x: nx,
                y: ny,
                modifiers,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_and_meta_both_mean_cmd() {
        assert!(Modifiers::from_raw(true, false, false, false).cmd);
        assert!(Modifiers::from_raw(false, false, false, true).cmd);
        assert_eq!(Modifiers::from_raw(false, true, false, false), Modifiers::SHIFT);
    }

    #[test]
    fn with_position_keeps_modifiers() {
        let ev = InputEvent::PointerMove {
            x: 1.0,
            y: 2.0,
            modifiers: Modifiers::SHIFT,
        };
        let moved = ev.with_position(10.0, 20.0);
        assert_eq!(moved.position(), Some((10.0, 20.0)));
        assert_eq!(moved.modifiers(), Modifiers::SHIFT);
        assert_eq!(InputEvent::key("a", Modifiers::CMD).position(), None);
    }
}
