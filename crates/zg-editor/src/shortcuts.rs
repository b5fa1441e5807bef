//! Keyboard shortcut table.
//!
//! Key combinations are written `mod+mod+key` (`"cmd+shift+z"`,
//! `"Backspace"`, `"cmd++"`). `cmd` also accepts `ctrl`, `meta`, `mod`;
//! `alt` also accepts `option`. Matching is global (independent of the
//! active state), first match wins in table order, and the modifier set
//! must be equal: `cmd+z` does not fire for ⌘⇧Z.

use crate::config::ShortcutConfig;
use crate::error::EditorError;
use crate::input::{KeyPress, Modifiers};
use winnow::ascii::{Caseless, space0};
use winnow::combinator::{alt, repeat, terminated};
use winnow::prelude::*;
use winnow::token::rest;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    SelectTool,
    RectangleTool,
    FrameTool,
    Delete,
    SelectAll,
    Undo,
    Redo,
    Duplicate,
    BringForward,
    SendBackward,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Cmd,
    Shift,
    Alt,
}

/// A parsed key combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn parse(text: &str) -> Result<Self, EditorError> {
        let invalid = |reason: &str| EditorError::InvalidShortcut {
            combo: text.to_string(),
            reason: reason.to_string(),
        };

        let (mods, key) = combo
            .parse(text.trim())
            .map_err(|e| invalid(&e.to_string()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(invalid("missing key"));
        }
        if key.len() > 1 && key.contains('+') {
            return Err(invalid("unknown modifier"));
        }

        let mut modifiers = Modifiers::NONE;
        for m in mods {
            match m {
                Modifier::Cmd => modifiers.cmd = true,
                Modifier::Shift => modifiers.shift = true,
                Modifier::Alt => modifiers.alt = true,
            }
        }
        Ok(Self {
            key: canonical_key(key),
            modifiers,
        })
    }

    /// Key names compare ASCII-case-insensitively so ⇧Z still reads as `z`.
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.modifiers == press.modifiers && self.key.eq_ignore_ascii_case(&press.key)
    }
}

fn modifier(input: &mut &str) -> ModalResult<Modifier> {
    terminated(
        alt((
            alt((
                Caseless("command"),
                Caseless("cmd"),
                Caseless("control"),
                Caseless("ctrl"),
                Caseless("meta"),
                Caseless("mod"),
            ))
            .value(Modifier::Cmd),
            Caseless("shift").value(Modifier::Shift),
            alt((Caseless("option"), Caseless("alt"))).value(Modifier::Alt),
        )),
        (space0, '+', space0),
    )
    .parse_next(input)
}

fn combo<'s>(input: &mut &'s str) -> ModalResult<(Vec<Modifier>, &'s str)> {
    (repeat(0.., modifier), rest).parse_next(input)
}

fn canonical_key(key: &str) -> String {
    match key.to_ascii_lowercase().as_str() {
        "esc" | "escape" => "Escape".to_string(),
        "del" | "delete" => "Delete".to_string(),
        "backspace" => "Backspace".to_string(),
        "space" => " ".to_string(),
        "tab" => "Tab".to_string(),
        "enter" | "return" => "Enter".to_string(),
        _ => key.to_string(),
    }
}

/// Ordered combo → action bindings.
#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    bindings: Vec<(KeyCombo, ShortcutAction)>,
}

impl ShortcutTable {
    /// Build from configuration. A combo bound to two different actions
    /// is rejected.
    pub fn from_config(config: &ShortcutConfig) -> Result<Self, EditorError> {
        let mut table = Self::default();
        for (action, combos) in config.bindings() {
            for text in combos {
                table.bind(text, action)?;
            }
        }
        Ok(table)
    }

    /// Append a binding. Binding a combo that already belongs to another
    /// action fails.
    pub fn bind(&mut self, text: &str, action: ShortcutAction) -> Result<(), EditorError> {
        let combo = KeyCombo::parse(text)?;
        if let Some(existing) = self.find(&combo)
            && existing != action
        {
            return Err(EditorError::InvalidShortcut {
                combo: text.to_string(),
                reason: format!("already bound to {existing:?}"),
            });
        }
        self.bindings.push((combo, action));
        Ok(())
    }

    pub fn resolve(&self, press: &KeyPress) -> Option<ShortcutAction> {
        let action = self
            .bindings
            .iter()
            .find(|(combo, _)| combo.matches(press))
            .map(|(_, action)| *action);
        log::trace!("shortcut {:?} {:?} -> {action:?}", press.key, press.modifiers);
        action
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn find(&self, combo: &KeyCombo) -> Option<ShortcutAction> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound.modifiers == combo.modifiers && bound.key.eq_ignore_ascii_case(&combo.key))
            .map(|(_, action)| *action)
    }
}
