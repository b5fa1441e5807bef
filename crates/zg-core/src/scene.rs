//! The scene graph: an ownership tree `Document → Page → … → Node`.
//!
//! Nodes are stored in a `StableDiGraph` whose edges go parent → child, so
//! each node's incoming edge is its (non-owning) parent reference. Sibling
//! order is kept per parent in `child_order`; both are updated together in
//! `attach`/`detach`, which are the only places structure changes.
//!
//! Outside this crate the scene is read-only: writes go through
//! `transaction::apply_transaction`.

use crate::error::SceneError;
use crate::id::NodeId;
use crate::model::{NodeKind, NodeProps, NodeType, SceneNode};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A detached node together with all of its descendants, in child order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtree {
    pub node: SceneNode,
    pub children: Vec<Subtree>,
}

impl Subtree {
    pub fn leaf(node: SceneNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Ids in pre-order (self first).
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.node.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    /// Number of nodes including self.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Subtree::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Where a node sits: its parent and its index among the siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub parent: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Scene {
    graph: StableDiGraph<SceneNode, ()>,
    root: NodeIndex,
    /// NodeId → NodeIndex, kept in sync with every structural mutation.
    id_index: HashMap<NodeId, NodeIndex>,
    /// Ordered children per parent.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
    current_page: NodeIndex,
    /// Every id this scene has issued or accepted. Generated ids skip these.
    known_ids: HashSet<NodeId>,
}

impl Scene {
    /// A document with one empty page, which is current.
    #[must_use]
    pub fn new() -> Self {
        let mut scene = Self::with_root(NodeId::with_prefix("document"));
        let page_id = scene.generate_id(NodeType::Page);
        let mut page = SceneNode::new(page_id, NodeKind::default_for(NodeType::Page));
        page.name = "Page 1".to_string();
        let idx = scene.attach(scene.root, None, page);
        scene.current_page = idx;
        scene
    }

    /// A bare document without pages. Callers must add a page before the
    /// scene is handed out.
    pub(crate) fn with_root(root_id: NodeId) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::new(root_id, NodeKind::Document));
        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);
        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
            current_page: root,
            known_ids: HashSet::from([root_id]),
        }
    }

    // ─── Lookup ──────────────────────────────────────────────────────────

    pub fn root_id(&self) -> NodeId {
        self.graph[self.root].id
    }

    pub fn root_node(&self) -> &SceneNode {
        &self.graph[self.root]
    }

    pub fn get_node_by_id(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Number of live nodes, document included.
    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    fn parent_idx(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    fn child_indices(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.index_of(id)?;
        self.parent_idx(idx).map(|p| self.graph[p].id)
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.index_of(id)
            .map(|idx| {
                self.child_indices(idx)
                    .iter()
                    .map(|c| self.graph[*c].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent and sibling index of a node. `None` for the root and for
    /// unknown ids.
    pub fn slot_of(&self, id: NodeId) -> Option<Slot> {
        let idx = self.index_of(id)?;
        let parent = self.parent_idx(idx)?;
        let index = self.child_indices(parent).iter().position(|c| *c == idx)?;
        Some(Slot {
            parent: self.graph[parent].id,
            index,
        })
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let Some(mut current) = self.index_of(descendant) else {
            return false;
        };
        while let Some(parent) = self.parent_idx(current) {
            if self.graph[parent].id == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    pub fn pages(&self) -> Vec<NodeId> {
        self.children_of(self.root_id())
    }

    pub fn current_page(&self) -> NodeId {
        self.graph[self.current_page].id
    }

    pub fn set_current_page(&mut self, id: NodeId) -> Result<(), SceneError> {
        let idx = self.index_of(id).ok_or(SceneError::UnknownNode(id))?;
        if self.graph[idx].node_type() != NodeType::Page {
            return Err(SceneError::NotAPage(id));
        }
        self.current_page = idx;
        Ok(())
    }

    // ─── Traversal ───────────────────────────────────────────────────────

    /// Visit `id` and all of its descendants depth-first, pre-order: the
    /// visitor sees a node before any of its children.
    pub fn traverse<F: FnMut(&SceneNode)>(&self, id: NodeId, mut visitor: F) {
        let Some(start) = self.index_of(id) else {
            return;
        };
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            visitor(&self.graph[idx]);
            stack.extend(self.child_indices(idx).iter().rev());
        }
    }

    /// `id` and its descendants, pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.traverse(id, |n| out.push(n.id));
        out
    }

    /// Every node on the current page, depth-first, page itself excluded.
    pub fn get_nodes(&self) -> Vec<NodeId> {
        let mut out = self.subtree_ids(self.current_page());
        out.remove(0);
        out
    }

    /// Snapshot a node and its descendants.
    pub fn subtree(&self, id: NodeId) -> Option<Subtree> {
        let idx = self.index_of(id)?;
        Some(self.subtree_at(idx))
    }

    fn subtree_at(&self, idx: NodeIndex) -> Subtree {
        Subtree {
            node: self.graph[idx].clone(),
            children: self
                .child_indices(idx)
                .iter()
                .map(|c| self.subtree_at(*c))
                .collect(),
        }
    }

    // ─── Element creation ────────────────────────────────────────────────

    /// A fresh id for a node of `node_type`, never previously seen by
    /// this scene.
    pub fn generate_id(&mut self, node_type: NodeType) -> NodeId {
        loop {
            let id = NodeId::with_prefix(node_type.id_prefix());
            if self.known_ids.insert(id) {
                return id;
            }
        }
    }

    /// Build a detached node with a generated id. The scene is unchanged
    /// apart from reserving the id; attach it with an `Add` record.
    pub fn create_element(&mut self, node_type: NodeType, props: NodeProps) -> SceneNode {
        let id = self.generate_id(node_type);
        let mut node = SceneNode::new(id, NodeKind::default_for(node_type));
        node.apply_props(props);
        node
    }

    // ─── Structural mutation (crate-internal) ────────────────────────────

    /// Link `node` under `parent` at `index` (clamped; `None` appends).
    /// Callers have validated the insertion.
    fn attach(&mut self, parent: NodeIndex, index: Option<usize>, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        let siblings = self.child_order.entry(parent).or_default();
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, idx);
        self.id_index.insert(id, idx);
        self.known_ids.insert(id);
        idx
    }

    fn validate_insert(&self, parent: NodeId, subtree: &Subtree) -> Result<NodeIndex, SceneError> {
        let parent_idx = self
            .index_of(parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        let parent_type = self.graph[parent_idx].node_type();
        check_containment(parent_type, subtree)?;
        let mut seen = HashSet::new();
        for id in subtree.ids() {
            if self.contains(id) || !seen.insert(id) {
                return Err(SceneError::DuplicateId(id));
            }
        }
        Ok(parent_idx)
    }

    /// Insert a whole subtree. Returns the sibling index it landed at.
    pub(crate) fn insert_subtree(
        &mut self,
        parent: NodeId,
        index: Option<usize>,
        subtree: Subtree,
    ) -> Result<usize, SceneError> {
        let parent_idx = self.validate_insert(parent, &subtree)?;
        let idx = self.attach_subtree(parent_idx, index, subtree);
        Ok(self
            .child_indices(parent_idx)
            .iter()
            .position(|c| *c == idx)
            .unwrap_or_default())
    }

    fn attach_subtree(&mut self, parent: NodeIndex, index: Option<usize>, subtree: Subtree) -> NodeIndex {
        let idx = self.attach(parent, index, subtree.node);
        for child in subtree.children {
            self.attach_subtree(idx, None, child);
        }
        idx
    }

    /// Detach a node and destroy its whole subtree. Returns where it was
    /// and what was removed, so the removal can be reversed.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Result<(Slot, Subtree), SceneError> {
        let idx = self.index_of(id).ok_or(SceneError::UnknownNode(id))?;
        if idx == self.root {
            return Err(SceneError::RootImmutable);
        }
        let slot = self.slot_of(id).ok_or(SceneError::UnknownNode(id))?;

        if self.graph[idx].node_type() == NodeType::Page {
            let pages = self.child_indices(self.root).to_vec();
            if pages.len() <= 1 {
                return Err(SceneError::LastPage(id));
            }
            if idx == self.current_page {
                let next = pages
                    .get(slot.index + 1)
                    .or_else(|| pages.get(slot.index.wrapping_sub(1)))
                    .copied()
                    .unwrap_or(self.root);
                self.current_page = next;
            }
        }

        let subtree = self.subtree_at(idx);
        self.detach(idx);
        let mut doomed = Vec::new();
        self.collect_indices(idx, &mut doomed);
        for victim in doomed {
            self.child_order.remove(&victim);
            if let Some(node) = self.graph.remove_node(victim) {
                self.id_index.remove(&node.id);
            }
        }
        Ok((slot, subtree))
    }

    fn collect_indices(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        out.push(idx);
        for child in self.child_indices(idx) {
            self.collect_indices(*child, out);
        }
    }

    /// Unlink `idx` from its parent's edge and order list.
    fn detach(&mut self, idx: NodeIndex) {
        if let Some(parent) = self.parent_idx(idx) {
            if let Some(edge) = self.graph.find_edge(parent, idx) {
                self.graph.remove_edge(edge);
            }
            if let Some(siblings) = self.child_order.get_mut(&parent) {
                siblings.retain(|c| *c != idx);
            }
        }
    }

    /// Move a node under `new_parent` at `index` (clamped; `None` appends).
    /// Returns the slot it came from and the slot it landed in.
    pub(crate) fn reparent(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: Option<usize>,
    ) -> Result<(Slot, Slot), SceneError> {
        let idx = self.index_of(id).ok_or(SceneError::UnknownNode(id))?;
        if idx == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent_idx = self
            .index_of(new_parent)
            .ok_or(SceneError::UnknownNode(new_parent))?;
        if new_parent == id || self.is_ancestor_of(id, new_parent) {
            return Err(SceneError::CycleDetected {
                node: id,
                parent: new_parent,
            });
        }
        let parent_type = self.graph[parent_idx].node_type();
        let child_type = self.graph[idx].node_type();
        if !parent_type.accepts_child(child_type) {
            return Err(SceneError::InvalidParent {
                parent: parent_type,
                child: child_type,
            });
        }
        let from = self.slot_of(id).ok_or(SceneError::UnknownNode(id))?;

        self.detach(idx);
        self.graph.add_edge(parent_idx, idx, ());
        let siblings = self.child_order.entry(parent_idx).or_default();
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, idx);

        Ok((
            from,
            Slot {
                parent: new_parent,
                index: at,
            },
        ))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn check_containment(parent: NodeType, subtree: &Subtree) -> Result<(), SceneError> {
    let child = subtree.node.node_type();
    if !parent.accepts_child(child) {
        return Err(SceneError::InvalidParent { parent, child });
    }
    subtree
        .children
        .iter()
        .try_for_each(|c| check_containment(child, c))
}
