//! Change records and atomic transaction application.
//!
//! Callers describe edits as `ChangeRecord`s. Applying them yields
//! `AppliedChange`s that carry everything needed to reverse the edit:
//! the full removed subtree of a delete, the live previous value of a
//! modify, and both slots of a move. `Transaction::inverse` is therefore
//! exact, and undo/redo are plain replays.

use crate::diagnostic::Diagnostic;
use crate::error::SceneError;
use crate::id::NodeId;
use crate::model::SceneNode;
use crate::property::{PropertyPath, PropertyValue};
use crate::scene::{Scene, Slot, Subtree};
use serde::{Deserialize, Serialize};

/// One requested edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    /// Insert a node (and any children) under `parent`. `index: None`
    /// appends.
    Add {
        parent: NodeId,
        index: Option<usize>,
        subtree: Subtree,
    },
    /// Remove a node and its whole subtree.
    Delete { id: NodeId },
    /// Set one property. `old` is what the caller believes is there; the
    /// live value is what gets recorded.
    Modify {
        id: NodeId,
        path: PropertyPath,
        old: Option<PropertyValue>,
        new: PropertyValue,
    },
    /// Reparent and/or reorder.
    Move {
        id: NodeId,
        parent: NodeId,
        index: Option<usize>,
    },
}

impl ChangeRecord {
    pub fn add(parent: NodeId, node: SceneNode) -> Self {
        ChangeRecord::Add {
            parent,
            index: None,
            subtree: Subtree::leaf(node),
        }
    }

    pub fn add_at(parent: NodeId, index: usize, node: SceneNode) -> Self {
        ChangeRecord::Add {
            parent,
            index: Some(index),
            subtree: Subtree::leaf(node),
        }
    }

    pub fn delete(id: NodeId) -> Self {
        ChangeRecord::Delete { id }
    }

    pub fn modify(
        id: NodeId,
        path: PropertyPath,
        old: impl Into<PropertyValue>,
        new: impl Into<PropertyValue>,
    ) -> Self {
        ChangeRecord::Modify {
            id,
            path,
            old: Some(old.into()),
            new: new.into(),
        }
    }

    /// A modify that records whatever value is live when it applies.
    pub fn set(id: NodeId, path: PropertyPath, new: impl Into<PropertyValue>) -> Self {
        ChangeRecord::Modify {
            id,
            path,
            old: None,
            new: new.into(),
        }
    }

    pub fn move_to(id: NodeId, parent: NodeId, index: Option<usize>) -> Self {
        ChangeRecord::Move { id, parent, index }
    }

    /// The node this record is about.
    pub fn target(&self) -> NodeId {
        match self {
            ChangeRecord::Add { subtree, .. } => subtree.node.id,
            ChangeRecord::Delete { id }
            | ChangeRecord::Modify { id, .. }
            | ChangeRecord::Move { id, .. } => *id,
        }
    }
}

/// One edit as it actually happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppliedChange {
    Added {
        slot: Slot,
        subtree: Subtree,
    },
    Deleted {
        slot: Slot,
        subtree: Subtree,
    },
    Modified {
        id: NodeId,
        path: PropertyPath,
        old: PropertyValue,
        new: PropertyValue,
    },
    Moved {
        id: NodeId,
        from: Slot,
        to: Slot,
    },
    /// A record whose target could not be resolved. Kept so the history
    /// shows it, but it does nothing in either direction.
    Skipped { id: NodeId },
}

impl AppliedChange {
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self.clone() {
            AppliedChange::Added { slot, subtree } => AppliedChange::Deleted { slot, subtree },
            AppliedChange::Deleted { slot, subtree } => AppliedChange::Added { slot, subtree },
            AppliedChange::Modified { id, path, old, new } => AppliedChange::Modified {
                id,
                path,
                old: new,
                new: old,
            },
            AppliedChange::Moved { id, from, to } => AppliedChange::Moved {
                id,
                from: to,
                to: from,
            },
            skipped @ AppliedChange::Skipped { .. } => skipped,
        }
    }
}

/// An ordered group of applied changes; the unit of undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub changes: Vec<AppliedChange>,
}

impl Transaction {
    pub fn new(changes: Vec<AppliedChange>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Append another transaction's changes after this one's.
    pub fn extend(&mut self, other: Transaction) {
        self.changes.extend(other.changes);
    }

    /// Reversed order, each change inverted.
    #[must_use]
    pub fn inverse(&self) -> Transaction {
        Transaction {
            changes: self.changes.iter().rev().map(AppliedChange::inverse).collect(),
        }
    }
}

/// Outcome of `apply_transaction`.
#[derive(Debug, Clone, Default)]
pub struct Applied {
    pub transaction: Transaction,
    pub diagnostics: Vec<Diagnostic>,
}

/// Apply `records` in order, all or nothing.
///
/// A record whose target (or parent) does not exist is skipped with a
/// warning diagnostic. Any structural error undoes the records already
/// applied and returns the error; the scene is then as it was.
pub fn apply_transaction(
    scene: &mut Scene,
    records: Vec<ChangeRecord>,
) -> Result<Applied, SceneError> {
    let mut applied = Applied::default();
    for record in records {
        match apply_record(scene, record, &mut applied.diagnostics) {
            Ok(change) => applied.transaction.changes.push(change),
            Err(err) => {
                log::warn!("transaction rejected: {err}");
                rollback(scene, &applied.transaction.changes);
                return Err(err);
            }
        }
    }
    Ok(applied)
}

fn skipped(
    id: NodeId,
    missing: NodeId,
    what: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> AppliedChange {
    log::warn!("{what} skipped: `{missing}` does not exist");
    diagnostics.push(Diagnostic::warning(
        id,
        "unknown-node",
        format!("{what} skipped: `{missing}` does not exist"),
    ));
    AppliedChange::Skipped { id }
}

fn apply_record(
    scene: &mut Scene,
    record: ChangeRecord,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<AppliedChange, SceneError> {
    match record {
        ChangeRecord::Add {
            parent,
            index,
            subtree,
        } => {
            let id = subtree.node.id;
            if !scene.contains(parent) {
                return Ok(skipped(id, parent, "add", diagnostics));
            }
            let index = scene.insert_subtree(parent, index, subtree.clone())?;
            Ok(AppliedChange::Added {
                slot: Slot { parent, index },
                subtree,
            })
        }
        ChangeRecord::Delete { id } => {
            if !scene.contains(id) {
                return Ok(skipped(id, id, "delete", diagnostics));
            }
            let (slot, subtree) = scene.remove_subtree(id)?;
            Ok(AppliedChange::Deleted { slot, subtree })
        }
        ChangeRecord::Modify { id, path, old, new } => {
            let Some(node) = scene.node_mut(id) else {
                return Ok(skipped(id, id, "modify", diagnostics));
            };
            let live = node.set(path, new.clone())?;
            if old.as_ref().is_some_and(|expected| *expected != live) {
                log::debug!("`{id}.{path}` changed underneath the caller; recording live value");
                diagnostics.push(Diagnostic::info(
                    id,
                    "stale-old-value",
                    format!("`{path}` was {live:?}, not the expected value"),
                ));
            }
            Ok(AppliedChange::Modified {
                id,
                path,
                old: live,
                new,
            })
        }
        ChangeRecord::Move { id, parent, index } => {
            if !scene.contains(id) {
                return Ok(skipped(id, id, "move", diagnostics));
            }
            if !scene.contains(parent) {
                return Ok(skipped(id, parent, "move", diagnostics));
            }
            let (from, to) = scene.reparent(id, parent, index)?;
            Ok(AppliedChange::Moved { id, from, to })
        }
    }
}

/// Re-apply a change that was produced by `apply_transaction` (or is the
/// inverse of one).
pub fn apply_change(scene: &mut Scene, change: &AppliedChange) -> Result<(), SceneError> {
    match change {
        AppliedChange::Added { slot, subtree } => {
            scene.insert_subtree(slot.parent, Some(slot.index), subtree.clone())?;
        }
        AppliedChange::Deleted { subtree, .. } => {
            scene.remove_subtree(subtree.node.id)?;
        }
        AppliedChange::Modified { id, path, new, .. } => {
            let node = scene.node_mut(*id).ok_or(SceneError::UnknownNode(*id))?;
            node.set(*path, new.clone())?;
        }
        AppliedChange::Moved { id, to, .. } => {
            scene.reparent(*id, to.parent, Some(to.index))?;
        }
        AppliedChange::Skipped { .. } => {}
    }
    Ok(())
}

/// Replay a recorded transaction, all or nothing.
pub fn replay(scene: &mut Scene, transaction: &Transaction) -> Result<(), SceneError> {
    for (i, change) in transaction.changes.iter().enumerate() {
        if let Err(err) = apply_change(scene, change) {
            log::error!("replay failed at change {i}: {err}");
            rollback(scene, &transaction.changes[..i]);
            return Err(err);
        }
    }
    Ok(())
}

/// Undo `done` in reverse order.
fn rollback(scene: &mut Scene, done: &[AppliedChange]) {
    for change in done.iter().rev() {
        if let Err(err) = apply_change(scene, &change.inverse()) {
            log::error!("rollback step failed: {err}");
        }
    }
}
