//! Paint model: 8-bit RGBA colors, solid and image paints, stroke props.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color with 8-bit channels, as stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Default page background (light canvas grey).
    pub const CANVAS: Self = Self::new(245, 245, 245, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => Some(Self::new(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
                255,
            )),
            6 => Some(Self::new(pair(0)?, pair(2)?, pair(4)?, 255)),
            8 => Some(Self::new(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::BLACK
    }
}

// ─── Paint ───────────────────────────────────────────────────────────────

/// Opaque reference to an image asset; turned into a texture by the
/// renderer's asset resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Paint {
    Solid {
        color: Rgba8,
        /// Multiplier in `0.0..=1.0`, applied on top of `color.a`.
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    Image {
        image: ImageRef,
    },
}

fn default_opacity() -> f32 {
    1.0
}

impl Paint {
    pub fn solid(color: Rgba8) -> Self {
        Paint::Solid {
            color,
            opacity: 1.0,
        }
    }

    pub fn image(key: impl Into<String>) -> Self {
        Paint::Image {
            image: ImageRef::new(key),
        }
    }
}

/// Ordered paint list. Nearly every node carries zero or one paint.
pub type PaintList = SmallVec<[Paint; 1]>;

// ─── Stroke ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeProps {
    pub stroke_weight: f32,
    pub stroke_paints: PaintList,
}

impl Default for StrokeProps {
    fn default() -> Self {
        Self {
            stroke_weight: 1.0,
            stroke_paints: PaintList::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let c = Rgba8::from_hex("#6C5CE7").unwrap();
        assert_eq!(c, Rgba8::new(0x6C, 0x5C, 0xE7, 255));
        assert_eq!(c.to_hex(), "#6C5CE7");

        let translucent = Rgba8::from_hex("FF000080").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#FF000080");
    }

    #[test]
    fn short_hex_expands() {
        assert_eq!(Rgba8::from_hex("#f0a"), Some(Rgba8::new(255, 0, 170, 255)));
        assert_eq!(Rgba8::from_hex("#12345"), None);
        assert_eq!(Rgba8::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn solid_paint_defaults_opacity() {
        let paint: Paint =
            serde_json::from_str(r#"{"type":"Solid","color":{"r":1,"g":2,"b":3,"a":4}}"#).unwrap();
        assert_eq!(
            paint,
            Paint::Solid {
                color: Rgba8::new(1, 2, 3, 4),
                opacity: 1.0
            }
        );
    }
}
