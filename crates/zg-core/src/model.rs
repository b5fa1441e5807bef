//! Design node model.
//!
//! A `SceneNode` carries one element's own attributes (geometry, paints,
//! flags and its kind-specific data). Structure (parent and ordered
//! children) lives in the `Scene`, never inside the node.

use crate::geometry::{Geometry, Transform};
use crate::id::NodeId;
use crate::paint::{PaintList, Rgba8, StrokeProps};
use serde::{Deserialize, Serialize};

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The closed set of node type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Page,
    Frame,
    Rectangle,
    Text,
}

impl NodeType {
    /// Prefix used for generated ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NodeType::Document => "document",
            NodeType::Page => "page",
            NodeType::Frame => "frame",
            NodeType::Rectangle => "rectangle",
            NodeType::Text => "text",
        }
    }

    /// Whether nodes of this type are drawn at all.
    pub fn is_visual(self) -> bool {
        !matches!(self, NodeType::Document | NodeType::Page)
    }

    /// Containment rules of the tree.
    pub fn accepts_child(self, child: NodeType) -> bool {
        match self {
            NodeType::Document => child == NodeType::Page,
            NodeType::Page | NodeType::Frame => {
                matches!(child, NodeType::Frame | NodeType::Rectangle | NodeType::Text)
            }
            NodeType::Rectangle | NodeType::Text => false,
        }
    }
}

/// Kind-specific data, tagged by node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of ownership; exactly one per scene.
    Document,

    /// A canvas page. Only pages sit directly under the document.
    Page { background: Rgba8 },

    /// Container with its own fill/stroke, optionally clipping its children.
    Frame { corner_radius: f32, clip: bool },

    Rectangle { corner_radius: f32 },

    Text { content: String },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::Page { .. } => NodeType::Page,
            NodeKind::Frame { .. } => NodeType::Frame,
            NodeKind::Rectangle { .. } => NodeType::Rectangle,
            NodeKind::Text { .. } => NodeType::Text,
        }
    }

    /// Default kind data for a node type.
    pub fn default_for(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Document => NodeKind::Document,
            NodeType::Page => NodeKind::Page {
                background: Rgba8::CANVAS,
            },
            NodeType::Frame => NodeKind::Frame {
                corner_radius: 0.0,
                clip: true,
            },
            NodeType::Rectangle => NodeKind::Rectangle { corner_radius: 0.0 },
            NodeType::Text => NodeKind::Text {
                content: String::new(),
            },
        }
    }
}

// ─── Scene nodes ─────────────────────────────────────────────────────────

/// One design element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    /// Display name for layer lists.
    pub name: String,
    pub kind: NodeKind,
    pub geometry: Geometry,
    pub fill_paints: PaintList,
    pub stroke: StrokeProps,
    pub visible: bool,
    pub locked: bool,
}

impl SceneNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            name: id.as_str().to_string(),
            kind,
            geometry: Geometry::default(),
            fill_paints: PaintList::new(),
            stroke: StrokeProps::default(),
            visible: true,
            locked: false,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Apply the `Some` fields of a partial property set.
    pub fn apply_props(&mut self, props: NodeProps) {
        let g = &mut self.geometry;
        if let Some(x) = props.x {
            g.x = x;
        }
        if let Some(y) = props.y {
            g.y = y;
        }
        if let Some(w) = props.width {
            g.width = w;
        }
        if let Some(h) = props.height {
            g.height = h;
        }
        if let Some(r) = props.rotation {
            g.rotation = r;
        }
        g.transform = match props.transform {
            Some(t) => t,
            None => Transform::from_position_rotation(g.x, g.y, g.rotation),
        };
        if let Some(name) = props.name {
            self.name = name;
        }
        if let Some(fills) = props.fill_paints {
            self.fill_paints = fills;
        }
        if let Some(stroke) = props.stroke {
            self.stroke = stroke;
        }
        if let Some(visible) = props.visible {
            self.visible = visible;
        }
        if let Some(locked) = props.locked {
            self.locked = locked;
        }
    }
}

/// Partial property set used when creating elements.
#[derive(Debug, Clone, Default)]
pub struct NodeProps {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    /// Explicit matrix; when absent it is derived from x, y and rotation.
    pub transform: Option<Transform>,
    pub fill_paints: Option<PaintList>,
    pub stroke: Option<StrokeProps>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl NodeProps {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_fill(mut self, paint: crate::paint::Paint) -> Self {
        self.fill_paints.get_or_insert_with(PaintList::new).push(paint);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Paint;

    #[test]
    fn containment_rules() {
        assert!(NodeType::Document.accepts_child(NodeType::Page));
        assert!(!NodeType::Document.accepts_child(NodeType::Rectangle));
        assert!(NodeType::Page.accepts_child(NodeType::Frame));
        assert!(NodeType::Frame.accepts_child(NodeType::Text));
        assert!(!NodeType::Frame.accepts_child(NodeType::Page));
        assert!(!NodeType::Rectangle.accepts_child(NodeType::Rectangle));
    }

    #[test]
    fn apply_props_derives_transform() {
        let mut node = SceneNode::new(
            NodeId::intern("card"),
            NodeKind::default_for(NodeType::Rectangle),
        );
        node.apply_props(
            NodeProps::rect(10.0, 20.0, 100.0, 50.0).with_fill(Paint::solid(Rgba8::WHITE)),
        );
        assert_eq!(node.geometry.transform, Transform::translate(10.0, 20.0));
        assert_eq!(node.geometry.width, 100.0);
        assert_eq!(node.fill_paints.len(), 1);
        assert!(node.visible);
        assert!(!node.locked);
    }

    #[test]
    fn visual_types() {
        assert!(!NodeType::Page.is_visual());
        assert!(NodeType::Text.is_visual());
    }
}
