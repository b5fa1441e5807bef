//! Scene nodes → backend primitives, one to one.
//!
//! Pull-based: nothing here watches the scene. Callers push nodes in after
//! a transaction, either one at a time or by handing over the editor's
//! drained `ChangeSet`.

use crate::paint::{resolve_first, resolve_stroke};
use crate::primitive::{AssetResolver, PrimitiveProps, RenderBackend};
use kurbo::Rect;
use std::collections::{HashMap, HashSet};
use zg_core::{ChangeSet, NodeId, NodeKind, Scene, SceneNode};

pub struct RenderSync<B: RenderBackend, R> {
    backend: B,
    resolver: R,
    handles: HashMap<NodeId, B::Handle>,
}

impl<B, R> RenderSync<B, R>
where
    B: RenderBackend,
    R: AssetResolver<B::Texture>,
{
    pub fn new(backend: B, resolver: R) -> Self {
        Self {
            backend,
            resolver,
            handles: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn handle_of(&self, id: NodeId) -> Option<B::Handle> {
        self.handles.get(&id).copied()
    }

    /// Number of live primitives.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Allocate a primitive for `node` and fully sync it. Document and
    /// page nodes have no primitive. A node that already has one keeps it
    /// and is just re-synced.
    pub fn create_render_node(&mut self, node: &SceneNode) -> Option<B::Handle> {
        if !node.node_type().is_visual() {
            return None;
        }
        let handle = match self.handles.get(&node.id) {
            Some(handle) => *handle,
            None => {
                let handle = self.backend.create_primitive();
                log::trace!("primitive {handle:?} allocated for `{}`", node.id);
                self.handles.insert(node.id, handle);
                handle
            }
        };
        self.update_render_node(handle, node);
        Some(handle)
    }

    /// Full re-sync of geometry, transform, fill, stroke and visibility.
    pub fn update_render_node(&mut self, handle: B::Handle, node: &SceneNode) {
        let props = self.primitive_props(node);
        self.backend.update_primitive(handle, &props);
    }

    pub fn set_render_order(&mut self, handle: B::Handle, order: usize) {
        self.backend.set_order(handle, order);
    }

    /// Release the node's primitive. Returns false if it had none.
    pub fn destroy_render_node(&mut self, id: NodeId) -> bool {
        match self.handles.remove(&id) {
            Some(handle) => {
                log::trace!("primitive {handle:?} destroyed for `{id}`");
                self.backend.destroy_primitive(handle);
                true
            }
            None => false,
        }
    }

    pub fn primitive_props(&mut self, node: &SceneNode) -> PrimitiveProps<B::Texture> {
        let g = &node.geometry;
        let corner_radius = match node.kind {
            NodeKind::Rectangle { corner_radius } | NodeKind::Frame { corner_radius, .. } => {
                corner_radius
            }
            _ => 0.0,
        };
        PrimitiveProps {
            rect: Rect::new(0.0, 0.0, f64::from(g.width), f64::from(g.height)),
            corner_radius,
            transform: g.transform,
            fill: resolve_first(&node.fill_paints, &mut self.resolver),
            stroke: resolve_stroke(&node.stroke, &mut self.resolver),
            visible: node.visible,
        }
    }

    /// Bring every primitive in line with the current page: create the
    /// missing ones, re-sync all, order them depth-first and drop the rest.
    pub fn sync_scene(&mut self, scene: &Scene) {
        let ids = scene.get_nodes();
        let live: HashSet<NodeId> = ids.iter().copied().collect();
        self.destroy_orphans(&live);
        for (order, id) in ids.iter().enumerate() {
            if let Some(node) = scene.get_node_by_id(*id)
                && let Some(handle) = self.create_render_node(node)
            {
                self.set_render_order(handle, order);
            }
        }
    }

    /// Re-sync only what `changes` touched. Nodes outside the current
    /// page are skipped.
    pub fn apply_changes(&mut self, scene: &Scene, changes: &ChangeSet) {
        for id in &changes.removed {
            self.destroy_render_node(*id);
        }
        if changes.added.is_empty() && changes.modified.is_empty() && !changes.reordered {
            return;
        }

        let ids = scene.get_nodes();
        let live: HashSet<NodeId> = ids.iter().copied().collect();
        for id in changes.added.iter().chain(&changes.modified) {
            if !live.contains(id) {
                // Moved off the page, or never on it.
                self.destroy_render_node(*id);
                continue;
            }
            if let Some(node) = scene.get_node_by_id(*id) {
                self.create_render_node(node);
            }
        }

        if changes.reordered || !changes.added.is_empty() {
            for (order, id) in ids.iter().enumerate() {
                if let Some(handle) = self.handle_of(*id) {
                    self.set_render_order(handle, order);
                }
            }
        }
    }

    fn destroy_orphans(&mut self, live: &HashSet<NodeId>) {
        let orphans: Vec<NodeId> = self
            .handles
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in orphans {
            self.destroy_render_node(id);
        }
    }
}
