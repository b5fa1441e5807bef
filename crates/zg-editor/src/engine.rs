//! Transaction engine: the single writer of the scene.
//!
//! Every mutation (tool output, shortcut, inspector edit, undo, redo)
//! goes through here so the history, the diagnostics and the render
//! change set all see it.

use crate::history::History;
use zg_core::{
    ChangeRecord, ChangeSet, Diagnostic, NodeId, NodeProps, NodeType, Scene, SceneError,
    SceneNode, Transaction, apply_transaction,
};

pub struct TransactionEngine {
    scene: Scene,
    history: History,
    diagnostics: Vec<Diagnostic>,
    changes: ChangeSet,
}

impl TransactionEngine {
    pub fn new(scene: Scene, history_depth: usize) -> Self {
        Self {
            scene,
            history: History::new(history_depth),
            diagnostics: Vec::new(),
            changes: ChangeSet::default(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Reserve a fresh id without building a node.
    pub fn generate_id(&mut self, node_type: NodeType) -> NodeId {
        self.scene.generate_id(node_type)
    }

    /// Build a detached node with a fresh id.
    pub fn create_element(&mut self, node_type: NodeType, props: NodeProps) -> SceneNode {
        self.scene.create_element(node_type, props)
    }

    /// Apply `records` atomically and add them to the pending
    /// transaction. On error nothing is applied and nothing is pending.
    pub fn apply_transaction(&mut self, records: Vec<ChangeRecord>) -> Result<(), SceneError> {
        let count = records.len();
        let page = self.scene.current_page();
        let applied = apply_transaction(&mut self.scene, records)?;
        log::debug!(
            "applied transaction: {count} records, {} diagnostics",
            applied.diagnostics.len()
        );
        self.diagnostics.extend(applied.diagnostics);
        self.changes.record_transaction(&applied.transaction);
        self.history.push_pending(applied.transaction);
        self.follow_current_page(page);
        Ok(())
    }

    /// Move the pending transaction onto the undo stack.
    pub fn commit_history(&mut self) -> bool {
        self.history.commit()
    }

    /// Undo the last committed step. Anything still pending is committed
    /// first so it is what gets undone. `Ok(false)` means there was
    /// nothing to undo.
    pub fn undo_history(&mut self) -> Result<bool, SceneError> {
        if self.history.has_pending() {
            self.history.commit();
        }
        let page = self.scene.current_page();
        let reverted = self.history.undo(&mut self.scene)?;
        let done = self.absorb(reverted);
        self.follow_current_page(page);
        Ok(done)
    }

    pub fn redo_history(&mut self) -> Result<bool, SceneError> {
        let page = self.scene.current_page();
        let reapplied = self.history.redo(&mut self.scene)?;
        let done = self.absorb(reapplied);
        self.follow_current_page(page);
        Ok(done)
    }

    fn absorb(&mut self, applied: Option<Transaction>) -> bool {
        match applied {
            Some(transaction) => {
                self.changes.record_transaction(&transaction);
                true
            }
            None => false,
        }
    }

    /// Make `page` current. Not a transaction: the change set gets the
    /// old page's nodes as removed and the new page's as added.
    pub fn switch_page(&mut self, page: NodeId) -> Result<bool, SceneError> {
        if self.scene.current_page() == page {
            return Ok(false);
        }
        let leaving = self.scene.get_nodes();
        self.scene.set_current_page(page)?;
        for id in leaving {
            if !self.changes.added.shift_remove(&id) {
                self.changes.removed.insert(id);
            }
            self.changes.modified.shift_remove(&id);
        }
        self.enter_current_page();
        Ok(true)
    }

    /// The scene moves off the current page only when that page is
    /// deleted. Its nodes are already recorded as removed, so only the
    /// new page's nodes need to arrive.
    fn follow_current_page(&mut self, before: NodeId) {
        if self.scene.current_page() != before {
            log::debug!("current page {before} deleted, now {}", self.scene.current_page());
            self.enter_current_page();
        }
    }

    fn enter_current_page(&mut self) {
        for id in self.scene.get_nodes() {
            if !self.changes.removed.shift_remove(&id) {
                self.changes.added.insert(id);
            } else {
                self.changes.modified.insert(id);
            }
        }
        self.changes.reordered = true;
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Drain everything touched since the last call, for render sync.
    pub fn take_changes(&mut self) -> ChangeSet {
        std::mem::take(&mut self.changes)
    }

    /// Replace the document wholesale. History is cleared.
    pub fn load_scene(&mut self, scene: Scene) {
        let leaving = self.scene.get_nodes();
        self.scene = scene;
        self.history.clear();
        self.changes = ChangeSet::default();
        self.changes.removed.extend(leaving);
        self.changes.added.extend(self.scene.get_nodes());
        self.changes.reordered = true;
    }
}
