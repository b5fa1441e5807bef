//! Selection and hover state.
//!
//! Transient, never part of history. Ids are weak references: anything
//! that no longer resolves in the scene is dropped when read.

use indexmap::IndexSet;
use zg_core::{NodeId, Scene};

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: IndexSet<NodeId>,
    hovered: Option<NodeId>,
}

impl SelectionState {
    /// Replace the selection. Duplicates collapse; ids missing from the
    /// scene are filtered out. Returns whether the selection changed.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>, scene: &Scene) -> bool {
        let next: IndexSet<NodeId> = ids.into_iter().filter(|id| scene.contains(*id)).collect();
        if next == self.selected {
            return false;
        }
        self.selected = next;
        true
    }

    fn add(&mut self, id: NodeId, scene: &Scene) -> bool {
        scene.contains(id) && self.selected.insert(id)
    }

    /// Add if absent, remove if present.
    pub fn toggle(&mut self, id: NodeId, scene: &Scene) -> bool {
        if self.selected.shift_remove(&id) {
            return true;
        }
        self.add(id, scene)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids that still exist, in selection order.
    pub fn selected(&self, scene: &Scene) -> Vec<NodeId> {
        self.selected
            .iter()
            .copied()
            .filter(|id| scene.contains(*id))
            .collect()
    }

    /// Drop stale ids. Returns whether any were dropped.
    pub fn prune(&mut self, scene: &Scene) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| scene.contains(*id));
        let stale_hover = self.hovered.is_some_and(|id| !scene.contains(id));
        if stale_hover {
            self.hovered = None;
        }
        let dropped = before - self.selected.len();
        if dropped > 0 || stale_hover {
            log::debug!("pruned {dropped} stale selected ids (hover stale: {stale_hover})");
        }
        dropped > 0
    }

    pub fn hovered(&self, scene: &Scene) -> Option<NodeId> {
        self.hovered.filter(|id| scene.contains(*id))
    }

    /// Whether a hover id is stored, stale or not.
    pub fn has_hover(&self) -> bool {
        self.hovered.is_some()
    }

    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        self.hovered = id;
    }
}
