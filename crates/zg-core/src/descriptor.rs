//! Scene description format (camelCase JSON via serde).
//!
//! ```json
//! { "id": "doc", "type": "Document", "children": [
//!   { "id": "page_1", "type": "Page", "children": [
//!     { "id": "card", "type": "Rectangle", "x": 10, "y": 10, "w": 100, "h": 50,
//!       "fillPaints": [{ "type": "Solid", "color": { "r": 255, "g": 0, "b": 0, "a": 255 } }] }
//!   ] }
//! ] }
//! ```

use crate::error::SceneError;
use crate::geometry::{Geometry, Transform};
use crate::id::NodeId;
use crate::model::{NodeKind, NodeType, SceneNode};
use crate::paint::{PaintList, Rgba8, StrokeProps};
use crate::scene::{Scene, Subtree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub w: f32,
    #[serde(default)]
    pub h: f32,
    #[serde(default)]
    pub rotation: f32,
    /// Column-major 3×3 homogeneous matrix. Derived from x, y and rotation
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f32; 9]>,
    #[serde(default)]
    pub fill_paints: PaintList,
    #[serde(default)]
    pub stroke_props: StrokeProps,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescriptor>,
}

fn visible_by_default() -> bool {
    true
}

impl NodeDescriptor {
    fn to_node(&self) -> SceneNode {
        let kind = match NodeKind::default_for(self.node_type) {
            NodeKind::Page { background } => NodeKind::Page {
                background: self.background.unwrap_or(background),
            },
            NodeKind::Frame { corner_radius, clip } => NodeKind::Frame {
                corner_radius: self.corner_radius.unwrap_or(corner_radius),
                clip: self.clip.unwrap_or(clip),
            },
            NodeKind::Rectangle { corner_radius } => NodeKind::Rectangle {
                corner_radius: self.corner_radius.unwrap_or(corner_radius),
            },
            NodeKind::Text { content } => NodeKind::Text {
                content: self.content.clone().unwrap_or(content),
            },
            NodeKind::Document => NodeKind::Document,
        };
        let mut node = SceneNode::new(self.id, kind);
        if let Some(name) = &self.name {
            node.name.clone_from(name);
        }
        node.geometry = Geometry {
            x: self.x,
            y: self.y,
            width: self.w,
            height: self.h,
            rotation: self.rotation,
            transform: match &self.transform {
                Some(m) => Transform::from_mat3(m),
                None => Transform::from_position_rotation(self.x, self.y, self.rotation),
            },
        };
        node.fill_paints = self.fill_paints.clone();
        node.stroke = self.stroke_props.clone();
        node.visible = self.is_visible;
        node.locked = self.is_locked;
        node
    }

    fn to_subtree(&self) -> Subtree {
        Subtree {
            node: self.to_node(),
            children: self.children.iter().map(Self::to_subtree).collect(),
        }
    }

    fn from_node(node: &SceneNode, children: Vec<NodeDescriptor>) -> Self {
        let g = &node.geometry;
        let mut desc = Self {
            id: node.id,
            node_type: node.node_type(),
            name: (node.name != node.id.as_str()).then(|| node.name.clone()),
            x: g.x,
            y: g.y,
            w: g.width,
            h: g.height,
            rotation: g.rotation,
            transform: Some(g.transform.to_mat3()),
            fill_paints: node.fill_paints.clone(),
            stroke_props: node.stroke.clone(),
            is_visible: node.visible,
            is_locked: node.locked,
            corner_radius: None,
            clip: None,
            background: None,
            content: None,
            children,
        };
        match &node.kind {
            NodeKind::Document => {}
            NodeKind::Page { background } => desc.background = Some(*background),
            NodeKind::Frame { corner_radius, clip } => {
                desc.corner_radius = Some(*corner_radius);
                desc.clip = Some(*clip);
            }
            NodeKind::Rectangle { corner_radius } => desc.corner_radius = Some(*corner_radius),
            NodeKind::Text { content } => desc.content = Some(content.clone()),
        }
        desc
    }
}

impl Scene {
    /// Build a scene from a description rooted at a Document. The first
    /// page becomes current; a document without pages gets an empty one.
    pub fn from_descriptor(desc: &NodeDescriptor) -> Result<Scene, SceneError> {
        if desc.node_type != NodeType::Document {
            return Err(SceneError::InvalidRoot(desc.node_type));
        }
        let mut scene = Scene::with_root(desc.id);
        let root = scene.root_id();
        for page in &desc.children {
            scene.insert_subtree(root, None, page.to_subtree())?;
        }

        match scene.pages().first() {
            Some(first) => scene.set_current_page(*first)?,
            None => {
                log::debug!("description of `{}` has no pages; adding one", desc.id);
                let page = scene.create_element(NodeType::Page, Default::default());
                let page_id = page.id;
                scene.insert_subtree(root, None, Subtree::leaf(page))?;
                scene.set_current_page(page_id)?;
            }
        }
        Ok(scene)
    }

    /// Describe the whole document.
    pub fn to_descriptor(&self) -> NodeDescriptor {
        let root = self.root_node();
        NodeDescriptor::from_node(root, self.describe_children(root.id))
    }

    fn describe_children(&self, id: NodeId) -> Vec<NodeDescriptor> {
        self.children_of(id)
            .into_iter()
            .filter_map(|c| {
                let node = self.get_node_by_id(c)?;
                Some(NodeDescriptor::from_node(node, self.describe_children(c)))
            })
            .collect()
    }
}
