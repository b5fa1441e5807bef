//! Undo/Redo transaction stacks.
//!
//! Applied transactions first collect into a pending transaction; a
//! commit moves it onto the undo stack as one step. Undo replays the
//! inverse of the top entry and moves it to the redo stack; redo is the
//! mirror image.

use zg_core::{Scene, SceneError, Transaction, replay};

pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Applied but not yet committed.
    pending: Option<Transaction>,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(256)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            pending: None,
        }
    }

    /// Add applied changes to the pending transaction.
    pub fn push_pending(&mut self, transaction: Transaction) {
        match &mut self.pending {
            Some(pending) => pending.extend(transaction),
            None => self.pending = Some(transaction),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Push the pending transaction as one undo step and clear the redo
    /// stack. With nothing pending, only the redo stack is cleared.
    /// Returns whether an entry was pushed.
    pub fn commit(&mut self) -> bool {
        self.redo_stack.clear();
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.is_empty() {
            return false;
        }
        self.undo_stack.push(pending);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        true
    }

    /// Revert the top undo entry. Returns the changes that were actually
    /// applied to the scene (the inverse), or `None` when there is
    /// nothing to undo. On a replay error the scene and stacks are left
    /// as they were.
    pub fn undo(&mut self, scene: &mut Scene) -> Result<Option<Transaction>, SceneError> {
        let Some(transaction) = self.undo_stack.pop() else {
            return Ok(None);
        };
        let inverse = transaction.inverse();
        if let Err(err) = replay(scene, &inverse) {
            self.undo_stack.push(transaction);
            return Err(err);
        }
        self.redo_stack.push(transaction);
        Ok(Some(inverse))
    }

    /// Re-apply the top redo entry.
    pub fn redo(&mut self, scene: &mut Scene) -> Result<Option<Transaction>, SceneError> {
        let Some(transaction) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = replay(scene, &transaction) {
            self.redo_stack.push(transaction);
            return Err(err);
        }
        let applied = transaction.clone();
        self.undo_stack.push(transaction);
        Ok(Some(applied))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn peek_undo(&self) -> Option<&Transaction> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&Transaction> {
        self.redo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zg_core::{ChangeRecord, NodeId, NodeProps, NodeType, PropertyPath, apply_transaction};

    fn scene_with_box() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let page = scene.current_page();
        let node = scene.create_element(NodeType::Rectangle, NodeProps::rect(0.0, 0.0, 100.0, 50.0));
        let id = node.id;
        apply_transaction(&mut scene, vec![ChangeRecord::add(page, node)]).unwrap();
        (scene, id)
    }

    fn step(history: &mut History, scene: &mut Scene, id: NodeId, x: f32) {
        let applied = apply_transaction(scene, vec![ChangeRecord::set(id, PropertyPath::X, x)]).unwrap();
        history.push_pending(applied.transaction);
        history.commit();
    }

    fn x_of(scene: &Scene, id: NodeId) -> f32 {
        scene.get_node_by_id(id).unwrap().geometry.x
    }

    #[test]
    fn undo_redo_move() {
        let (mut scene, id) = scene_with_box();
        let mut history = History::new(100);
        step(&mut history, &mut scene, id, 50.0);

        assert!(history.undo(&mut scene).unwrap().is_some());
        assert_eq!(x_of(&scene, id), 0.0);
        assert_eq!(history.redo_len(), 1);

        assert!(history.redo(&mut scene).unwrap().is_some());
        assert_eq!(x_of(&scene, id), 50.0);
        assert!(!history.can_redo());
    }

    #[test]
    fn redo_clears_on_new_commit() {
        let (mut scene, id) = scene_with_box();
        let mut history = History::new(100);
        step(&mut history, &mut scene, id, 5.0);
        history.undo(&mut scene).unwrap();
        assert!(history.can_redo());

        step(&mut history, &mut scene, id, 1.0);
        assert!(!history.can_redo());
    }

    #[test]
    fn max_depth_trims_oldest() {
        let (mut scene, id) = scene_with_box();
        let mut history = History::new(3);
        for i in 0..5 {
            step(&mut history, &mut scene, id, (i + 1) as f32);
        }
        let mut undo_count = 0;
        while history.undo(&mut scene).unwrap().is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 3);
        assert_eq!(x_of(&scene, id), 2.0);
    }

    #[test]
    fn pending_changes_commit_as_one_step() {
        let (mut scene, id) = scene_with_box();
        let mut history = History::new(100);
        for x in [10.0, 20.0, 30.0] {
            let applied =
                apply_transaction(&mut scene, vec![ChangeRecord::set(id, PropertyPath::X, x)]).unwrap();
            history.push_pending(applied.transaction);
        }
        assert!(history.commit());
        assert_eq!(history.undo_len(), 1);

        history.undo(&mut scene).unwrap();
        assert_eq!(x_of(&scene, id), 0.0);
        assert!(!history.can_undo());
    }

    #[test]
    fn empty_commit_pushes_nothing() {
        let mut history = History::new(100);
        assert!(!history.commit());
        assert!(!history.can_undo());

        let mut scene = Scene::new();
        assert_eq!(history.undo(&mut scene), Ok(None));
    }
}
