//! Net effect of applied changes, for incremental consumers.
//!
//! The renderer does not care about the individual steps of a drag or an
//! undo, only which nodes now exist, which ones look different and which
//! ones are gone. `ChangeSet` folds applied changes into those three sets.

use crate::id::NodeId;
use crate::scene::Subtree;
use crate::transaction::{AppliedChange, Transaction};
use indexmap::IndexSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub added: IndexSet<NodeId>,
    pub modified: IndexSet<NodeId>,
    pub removed: IndexSet<NodeId>,
    /// Sibling order changed somewhere (add, delete or move).
    pub reordered: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty() && !self.reordered
    }

    pub fn record_transaction(&mut self, transaction: &Transaction) {
        for change in &transaction.changes {
            self.record(change);
        }
    }

    pub fn record(&mut self, change: &AppliedChange) {
        match change {
            AppliedChange::Added { subtree, .. } => {
                self.reordered = true;
                for_each_id(subtree, |id| {
                    // Deleted then re-added before anyone looked: it still
                    // exists downstream, so it only needs a refresh.
                    if self.removed.shift_remove(&id) {
                        self.modified.insert(id);
                    } else {
                        self.added.insert(id);
                    }
                });
            }
            AppliedChange::Deleted { subtree, .. } => {
                self.reordered = true;
                for_each_id(subtree, |id| {
                    self.modified.shift_remove(&id);
                    if !self.added.shift_remove(&id) {
                        self.removed.insert(id);
                    }
                });
            }
            AppliedChange::Modified { id, path, .. } => {
                if path.affects_render() && !self.added.contains(id) {
                    self.modified.insert(*id);
                }
            }
            AppliedChange::Moved { id, .. } => {
                self.reordered = true;
                if !self.added.contains(id) {
                    self.modified.insert(*id);
                }
            }
            AppliedChange::Skipped { .. } => {}
        }
    }
}

fn for_each_id(subtree: &Subtree, mut f: impl FnMut(NodeId)) {
    for id in subtree.ids() {
        f(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, NodeType, SceneNode};
    use crate::property::{PropertyPath, PropertyValue};
    use crate::scene::Slot;

    fn added(id: NodeId) -> AppliedChange {
        AppliedChange::Added {
            slot: Slot {
                parent: NodeId::intern("cs_page"),
                index: 0,
            },
            subtree: Subtree::leaf(SceneNode::new(id, NodeKind::default_for(NodeType::Rectangle))),
        }
    }

    #[test]
    fn add_then_delete_cancels_out() {
        let id = NodeId::intern("cs_a");
        let mut set = ChangeSet::default();
        set.record(&added(id));
        set.record(&added(id).inverse());
        assert!(set.added.is_empty());
        assert!(set.removed.is_empty());
        assert!(set.reordered);
    }

    #[test]
    fn delete_then_readd_is_a_modification() {
        let id = NodeId::intern("cs_b");
        let mut set = ChangeSet::default();
        set.record(&added(id).inverse());
        set.record(&added(id));
        assert!(set.removed.is_empty());
        assert!(set.modified.contains(&id));
    }

    #[test]
    fn non_visual_modify_is_ignored() {
        let id = NodeId::intern("cs_c");
        let mut set = ChangeSet::default();
        set.record(&AppliedChange::Modified {
            id,
            path: PropertyPath::Name,
            old: PropertyValue::Text("a".into()),
            new: PropertyValue::Text("b".into()),
        });
        assert!(set.is_empty());
    }
}
