//! Editor configuration, loadable from TOML.
//!
//! ```toml
//! history_depth = 200
//! default_fill = "#D9D9D9"
//!
//! [shortcuts]
//! undo = ["cmd+z"]
//! redo = ["cmd+y", "cmd+shift+z"]
//!
//! [zoom]
//! min = 0.1
//! max = 32.0
//! step = 1.25
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use crate::error::ConfigError;
use crate::shortcuts::ShortcutAction;
use serde::{Deserialize, Serialize};
use zg_core::Rgba8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo entries kept; the oldest are dropped beyond this.
    pub history_depth: usize,
    pub shortcuts: ShortcutConfig,
    /// Fill for nodes created by click (no drag) or drag.
    #[serde(with = "hex_color")]
    pub default_fill: Rgba8,
    /// Side length of a node created by a plain click.
    pub default_size: f32,
    pub zoom: ZoomConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 100,
            shortcuts: ShortcutConfig::default(),
            default_fill: Rgba8::new(217, 217, 217, 255),
            default_size: 100.0,
            zoom: ZoomConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ZoomConfig { min, max, step } = self.zoom;
        if !(min > 0.0 && min < max && step > 1.0) {
            return Err(ConfigError::InvalidZoom { min, max, step });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    /// Multiplier applied by zoom in / divided by zoom out.
    pub step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.02,
            max: 256.0,
            step: 1.25,
        }
    }
}

/// Key combinations per action. Table order (first match wins) follows
/// field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    #[serde(default = "default_select_tool")]
    pub select_tool: Vec<String>,

    #[serde(default = "default_rectangle_tool")]
    pub rectangle_tool: Vec<String>,

    #[serde(default = "default_frame_tool")]
    pub frame_tool: Vec<String>,

    #[serde(default = "default_delete")]
    pub delete: Vec<String>,

    #[serde(default = "default_select_all")]
    pub select_all: Vec<String>,

    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_duplicate")]
    pub duplicate: Vec<String>,

    #[serde(default = "default_bring_forward")]
    pub bring_forward: Vec<String>,

    #[serde(default = "default_send_backward")]
    pub send_backward: Vec<String>,

    #[serde(default = "default_zoom_in")]
    pub zoom_in: Vec<String>,

    #[serde(default = "default_zoom_out")]
    pub zoom_out: Vec<String>,

    #[serde(default = "default_zoom_reset")]
    pub zoom_reset: Vec<String>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            select_tool: default_select_tool(),
            rectangle_tool: default_rectangle_tool(),
            frame_tool: default_frame_tool(),
            delete: default_delete(),
            select_all: default_select_all(),
            undo: default_undo(),
            redo: default_redo(),
            duplicate: default_duplicate(),
            bring_forward: default_bring_forward(),
            send_backward: default_send_backward(),
            zoom_in: default_zoom_in(),
            zoom_out: default_zoom_out(),
            zoom_reset: default_zoom_reset(),
        }
    }
}

impl ShortcutConfig {
    /// `(action, combos)` pairs in table order.
    pub fn bindings(&self) -> [(ShortcutAction, &[String]); 13] {
        [
            (ShortcutAction::SelectTool, &self.select_tool),
            (ShortcutAction::RectangleTool, &self.rectangle_tool),
            (ShortcutAction::FrameTool, &self.frame_tool),
            (ShortcutAction::Delete, &self.delete),
            (ShortcutAction::SelectAll, &self.select_all),
            (ShortcutAction::Undo, &self.undo),
            (ShortcutAction::Redo, &self.redo),
            (ShortcutAction::Duplicate, &self.duplicate),
            (ShortcutAction::BringForward, &self.bring_forward),
            (ShortcutAction::SendBackward, &self.send_backward),
            (ShortcutAction::ZoomIn, &self.zoom_in),
            (ShortcutAction::ZoomOut, &self.zoom_out),
            (ShortcutAction::ZoomReset, &self.zoom_reset),
        ]
    }
}

fn combos(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_select_tool() -> Vec<String> {
    combos(&["v"])
}

fn default_rectangle_tool() -> Vec<String> {
    combos(&["r"])
}

fn default_frame_tool() -> Vec<String> {
    combos(&["f"])
}

fn default_delete() -> Vec<String> {
    combos(&["Backspace", "Delete"])
}

fn default_select_all() -> Vec<String> {
    combos(&["cmd+a"])
}

fn default_undo() -> Vec<String> {
    combos(&["cmd+z"])
}

fn default_redo() -> Vec<String> {
    combos(&["cmd+y", "cmd+shift+z"])
}

fn default_duplicate() -> Vec<String> {
    combos(&["cmd+d"])
}

fn default_bring_forward() -> Vec<String> {
    combos(&["cmd+]"])
}

fn default_send_backward() -> Vec<String> {
    combos(&["cmd+["])
}

fn default_zoom_in() -> Vec<String> {
    combos(&["cmd+="])
}

fn default_zoom_out() -> Vec<String> {
    combos(&["cmd+-"])
}

fn default_zoom_reset() -> Vec<String> {
    combos(&["cmd+0"])
}

/// `Rgba8` as a `#RRGGBB[AA]` string.
mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use zg_core::Rgba8;

    pub fn serialize<S: Serializer>(color: &Rgba8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgba8, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba8::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid color `{s}`")))
    }
}
