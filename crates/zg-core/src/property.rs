//! Typed property paths for Modify records.
//!
//! Inspectors address node attributes by name (`"x"`, `"cornerRadius"`).
//! Names resolve through a static table into a closed `PropertyPath`; each
//! path reads and writes exactly one stored field, so swapping a Modify's
//! old and new value is an exact inverse.

use crate::error::SceneError;
use crate::geometry::Transform;
use crate::model::{NodeKind, SceneNode};
use crate::paint::{PaintList, Rgba8};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyPath {
    X,
    Y,
    Width,
    Height,
    Rotation,
    Transform,
    CornerRadius,
    FillPaints,
    StrokePaints,
    StrokeWeight,
    Visible,
    Locked,
    Name,
    Background,
    Content,
    Clip,
}

/// Name → path lookup. Several names may alias one path; the first entry
/// for a path is its canonical name.
const PATH_TABLE: &[(&str, PropertyPath)] = &[
    ("x", PropertyPath::X),
    ("y", PropertyPath::Y),
    ("width", PropertyPath::Width),
    ("w", PropertyPath::Width),
    ("height", PropertyPath::Height),
    ("h", PropertyPath::Height),
    ("rotation", PropertyPath::Rotation),
    ("transform", PropertyPath::Transform),
    ("cornerRadius", PropertyPath::CornerRadius),
    ("borderRadius", PropertyPath::CornerRadius),
    ("fillPaints", PropertyPath::FillPaints),
    ("strokePaints", PropertyPath::StrokePaints),
    ("strokeWeight", PropertyPath::StrokeWeight),
    ("visible", PropertyPath::Visible),
    ("isVisible", PropertyPath::Visible),
    ("locked", PropertyPath::Locked),
    ("isLocked", PropertyPath::Locked),
    ("name", PropertyPath::Name),
    ("background", PropertyPath::Background),
    ("content", PropertyPath::Content),
    ("clip", PropertyPath::Clip),
];

impl PropertyPath {
    pub fn name(self) -> &'static str {
        PATH_TABLE
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Shape of the value this path stores.
    pub fn value_kind(self) -> ValueKind {
        match self {
            PropertyPath::X
            | PropertyPath::Y
            | PropertyPath::Width
            | PropertyPath::Height
            | PropertyPath::Rotation
            | PropertyPath::CornerRadius
            | PropertyPath::StrokeWeight => ValueKind::Number,
            PropertyPath::Transform => ValueKind::Transform,
            PropertyPath::FillPaints | PropertyPath::StrokePaints => ValueKind::Paints,
            PropertyPath::Visible | PropertyPath::Locked | PropertyPath::Clip => ValueKind::Bool,
            PropertyPath::Name | PropertyPath::Content => ValueKind::Text,
            PropertyPath::Background => ValueKind::Color,
        }
    }

    /// Whether a change to this path alters what the renderer draws.
    pub fn affects_render(self) -> bool {
        !matches!(
            self,
            PropertyPath::Name | PropertyPath::Locked | PropertyPath::Background
        )
    }
}

impl FromStr for PropertyPath {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PATH_TABLE
            .iter()
            .find(|(n, _)| *n == s)
            .map(|(_, p)| *p)
            .ok_or_else(|| SceneError::UnknownProperty(s.to_string()))
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Values ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Bool,
    Text,
    Color,
    Transform,
    Paints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f32),
    Bool(bool),
    Text(String),
    Color(Rgba8),
    Transform(Transform),
    Paints(PaintList),
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Number(_) => ValueKind::Number,
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Text(_) => ValueKind::Text,
            PropertyValue::Color(_) => ValueKind::Color,
            PropertyValue::Transform(_) => ValueKind::Transform,
            PropertyValue::Paints(_) => ValueKind::Paints,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(n: f32) -> Self {
        PropertyValue::Number(n)
    }
}

/// Unsuffixed float literals default to `f64`.
impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n as f32)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<Transform> for PropertyValue {
    fn from(t: Transform) -> Self {
        PropertyValue::Transform(t)
    }
}

impl From<Rgba8> for PropertyValue {
    fn from(c: Rgba8) -> Self {
        PropertyValue::Color(c)
    }
}

impl From<PaintList> for PropertyValue {
    fn from(p: PaintList) -> Self {
        PropertyValue::Paints(p)
    }
}

// ─── Access ──────────────────────────────────────────────────────────────

impl SceneNode {
    /// Read a property. Fails if this node type has no such property.
    pub fn get(&self, path: PropertyPath) -> Result<PropertyValue, SceneError> {
        let g = &self.geometry;
        let value = match (path, &self.kind) {
            (PropertyPath::X, _) => PropertyValue::Number(g.x),
            (PropertyPath::Y, _) => PropertyValue::Number(g.y),
            (PropertyPath::Width, _) => PropertyValue::Number(g.width),
            (PropertyPath::Height, _) => PropertyValue::Number(g.height),
            (PropertyPath::Rotation, _) => PropertyValue::Number(g.rotation),
            (PropertyPath::Transform, _) => PropertyValue::Transform(g.transform),
            (PropertyPath::FillPaints, _) => PropertyValue::Paints(self.fill_paints.clone()),
            (PropertyPath::StrokePaints, _) => {
                PropertyValue::Paints(self.stroke.stroke_paints.clone())
            }
            (PropertyPath::StrokeWeight, _) => PropertyValue::Number(self.stroke.stroke_weight),
            (PropertyPath::Visible, _) => PropertyValue::Bool(self.visible),
            (PropertyPath::Locked, _) => PropertyValue::Bool(self.locked),
            (PropertyPath::Name, _) => PropertyValue::Text(self.name.clone()),
            (
                PropertyPath::CornerRadius,
                NodeKind::Rectangle { corner_radius } | NodeKind::Frame { corner_radius, .. },
            ) => PropertyValue::Number(*corner_radius),
            (PropertyPath::Clip, NodeKind::Frame { clip, .. }) => PropertyValue::Bool(*clip),
            (PropertyPath::Background, NodeKind::Page { background }) => {
                PropertyValue::Color(*background)
            }
            (PropertyPath::Content, NodeKind::Text { content }) => {
                PropertyValue::Text(content.clone())
            }
            _ => {
                return Err(SceneError::UnsupportedProperty {
                    node_type: self.node_type(),
                    path,
                });
            }
        };
        Ok(value)
    }

    /// Write a property, returning the value it replaced.
    ///
    /// The node is untouched on error.
    pub fn set(
        &mut self,
        path: PropertyPath,
        value: PropertyValue,
    ) -> Result<PropertyValue, SceneError> {
        let old = self.get(path)?;
        if value.kind() != path.value_kind() {
            return Err(SceneError::PropertyMismatch {
                path,
                expected: path.value_kind(),
                found: value.kind(),
            });
        }

        let g = &mut self.geometry;
        match (path, value, &mut self.kind) {
            (PropertyPath::X, PropertyValue::Number(n), _) => g.x = n,
            (PropertyPath::Y, PropertyValue::Number(n), _) => g.y = n,
            (PropertyPath::Width, PropertyValue::Number(n), _) => g.width = n,
            (PropertyPath::Height, PropertyValue::Number(n), _) => g.height = n,
            (PropertyPath::Rotation, PropertyValue::Number(n), _) => g.rotation = n,
            (PropertyPath::Transform, PropertyValue::Transform(t), _) => g.transform = t,
            (PropertyPath::FillPaints, PropertyValue::Paints(p), _) => self.fill_paints = p,
            (PropertyPath::StrokePaints, PropertyValue::Paints(p), _) => {
                self.stroke.stroke_paints = p
            }
            (PropertyPath::StrokeWeight, PropertyValue::Number(n), _) => {
                self.stroke.stroke_weight = n
            }
            (PropertyPath::Visible, PropertyValue::Bool(b), _) => self.visible = b,
            (PropertyPath::Locked, PropertyValue::Bool(b), _) => self.locked = b,
            (PropertyPath::Name, PropertyValue::Text(s), _) => self.name = s,
            (
                PropertyPath::CornerRadius,
                PropertyValue::Number(n),
                NodeKind::Rectangle { corner_radius } | NodeKind::Frame { corner_radius, .. },
            ) => *corner_radius = n,
            (PropertyPath::Clip, PropertyValue::Bool(b), NodeKind::Frame { clip, .. }) => {
                *clip = b
            }
            (PropertyPath::Background, PropertyValue::Color(c), NodeKind::Page { background }) => {
                *background = c
            }
            (PropertyPath::Content, PropertyValue::Text(s), NodeKind::Text { content }) => {
                *content = s
            }
            // `get` above already rejected unsupported paths and the kind
            // check rejected mismatched values.
            _ => unreachable!("property {path} validated but not written"),
        }
        Ok(old)
    }
}
