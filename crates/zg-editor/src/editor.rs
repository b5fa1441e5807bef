//! The editor session object.
//!
//! `Editor` owns one document and everything that edits it: the
//! transaction engine (and through it the scene and history), the event
//! manager, selection and hover, the mode machine, the shortcut table and
//! the viewport. Hosts create one per open document and drive it with
//! input events and explicit commands.
//!
//! Every command that edits the document applies its records as one
//! transaction and commits it before any notification goes out, so
//! subscribers always observe a fully applied change.

use crate::config::EditorConfig;
use crate::engine::TransactionEngine;
use crate::error::EditorError;
use crate::events::{Channel, EditorEvent, EventManager, SubscriptionId};
use crate::input::{InputEvent, KeyPress};
use crate::modes::{Mode, ModeManager, Preview, StateContext, StateId, ToolOutcome};
use crate::selection::SelectionState;
use crate::shortcuts::{ShortcutAction, ShortcutTable};
use crate::tools::{content_move_records, move_records};
use indexmap::IndexMap;
use zg_core::{
    ChangeRecord, ChangeSet, Diagnostic, NodeId, NodeProps, NodeType, PropertyPath, PropertyValue,
    Rgba8, Scene, SceneError, Subtree,
};
use zg_render::Viewport;

/// Offset applied to duplicated nodes.
const DUPLICATE_OFFSET: f32 = 10.0;

pub struct Editor {
    engine: TransactionEngine,
    events: EventManager,
    selection: SelectionState,
    modes: ModeManager,
    shortcuts: ShortcutTable,
    viewport: Viewport,
    config: EditorConfig,
}

impl Editor {
    /// A new session on an empty document with one page.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_scene(Scene::new(), config)
    }

    pub fn with_scene(scene: Scene, config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        let shortcuts = ShortcutTable::from_config(&config.shortcuts)?;
        Ok(Self {
            engine: TransactionEngine::new(scene, config.history_depth),
            events: EventManager::new(),
            selection: SelectionState::default(),
            modes: ModeManager::new(Mode::editor()),
            shortcuts,
            viewport: Viewport::with_limits(config.zoom.min, config.zoom.max),
            config,
        })
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        self.engine.scene()
    }

    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pages(&self) -> Vec<NodeId> {
        self.scene().pages()
    }

    pub fn current_page(&self) -> NodeId {
        self.scene().current_page()
    }

    /// Selected ids still present in the scene.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.selected(self.scene())
    }

    pub fn hovered_node(&self) -> Option<NodeId> {
        self.selection.hovered(self.scene())
    }

    pub fn current_state(&self) -> &StateId {
        self.modes.mode().current_state()
    }

    pub fn modes(&self) -> &ModeManager {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeManager {
        &mut self.modes
    }

    /// Feedback for the gesture in progress, if any.
    pub fn preview(&self) -> Option<Preview> {
        self.modes.mode().current().and_then(|state| state.preview())
    }

    pub fn can_undo(&self) -> bool {
        self.engine.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.history().can_redo()
    }

    /// Drain touched node ids for render sync.
    pub fn take_changes(&mut self) -> ChangeSet {
        self.engine.take_changes()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.engine.take_diagnostics()
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    pub fn on(
        &mut self,
        channel: Channel,
        handler: impl FnMut(&EditorEvent) + 'static,
    ) -> SubscriptionId {
        self.events.on(channel, handler)
    }

    pub fn off(&mut self, channel: Channel, id: SubscriptionId) -> bool {
        self.events.off(channel, id)
    }

    // ─── Transactions ────────────────────────────────────────────────────

    /// Apply records into the pending transaction without committing.
    pub fn apply_transaction(&mut self, records: Vec<ChangeRecord>) -> Result<(), EditorError> {
        let page = self.current_page();
        self.engine.apply_transaction(records)?;
        self.settle(page);
        Ok(())
    }

    /// Commit the pending transaction as one undo step.
    pub fn commit_history(&mut self) -> bool {
        let pushed = self.engine.commit_history();
        self.emit_history();
        pushed
    }

    /// Apply and commit. Empty input is a no-op.
    fn transact(&mut self, records: Vec<ChangeRecord>) -> Result<bool, EditorError> {
        if records.is_empty() {
            return Ok(false);
        }
        let page = self.current_page();
        self.engine.apply_transaction(records)?;
        let pushed = self.engine.commit_history();
        self.settle(page);
        self.emit_history();
        Ok(pushed)
    }

    /// Revert the last step. `Ok(false)` (and no notification) when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let page = self.current_page();
        if !self.engine.undo_history()? {
            return Ok(false);
        }
        self.settle(page);
        self.emit_history();
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let page = self.current_page();
        if !self.engine.redo_history()? {
            return Ok(false);
        }
        self.settle(page);
        self.emit_history();
        Ok(true)
    }

    /// Replace the document. History, selection and hover are reset.
    pub fn load_scene(&mut self, scene: Scene) {
        self.engine.load_scene(scene);
        self.set_selected_nodes(Vec::new());
        if self.selection.has_hover() {
            self.set_hover_node(None);
        }
        self.emit_history();
        self.events.emit(&EditorEvent::PageChanged {
            page: self.current_page(),
        });
    }

    /// Catch up after the scene changed: drop stale selection and hover,
    /// and announce a new current page if the old one was deleted.
    fn settle(&mut self, page_before: NodeId) {
        self.revalidate();
        if self.current_page() != page_before {
            self.on_page_switched();
        }
    }

    fn revalidate(&mut self) {
        let had_hover = self.selection.has_hover();
        if self.selection.prune(self.engine.scene()) {
            self.emit_selection();
        }
        if had_hover && !self.selection.has_hover() {
            self.events.emit(&EditorEvent::HoverChanged { hovered: None });
        }
    }

    fn emit_history(&mut self) {
        let history = self.engine.history();
        let event = EditorEvent::HistoryChanged {
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        };
        self.events.emit(&event);
    }

    fn emit_selection(&mut self) {
        let selected = self.selected_nodes();
        self.events.emit(&EditorEvent::SelectionChanged { selected });
    }

    // ─── Selection & hover ───────────────────────────────────────────────

    /// Replace the selection; duplicates and unknown ids are dropped.
    /// Notifies only when the selection actually changed.
    pub fn set_selected_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) -> bool {
        let changed = self.selection.set(ids, self.engine.scene());
        if changed {
            self.emit_selection();
        }
        changed
    }

    /// Select every node on the current page.
    pub fn select_all(&mut self) -> bool {
        let all = self.scene().get_nodes();
        self.set_selected_nodes(all)
    }

    /// Replace the hovered node. Always notifies once, even when the
    /// hovered node is unchanged.
    pub fn set_hover_node(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.scene().contains(*id));
        self.selection.set_hovered(id);
        self.events.emit(&EditorEvent::HoverChanged { hovered: id });
    }

    /// Hover by id string; empty or unknown clears the hover.
    pub fn set_hover_node_id(&mut self, id: &str) {
        let id = NodeId::lookup(id).filter(|id| self.scene().contains(*id));
        self.set_hover_node(id);
    }

    // ─── States ──────────────────────────────────────────────────────────

    pub fn change_state(&mut self, id: &StateId) -> Result<(), EditorError> {
        let from = self.modes.mode_mut().change_state(id)?;
        self.events.emit(&EditorEvent::StateChanged {
            from,
            to: id.clone(),
        });
        Ok(())
    }

    pub fn go_to_default_state(&mut self) {
        let from = self.modes.mode_mut().go_to_default_state();
        let to = self.current_state().clone();
        if from != to {
            self.events.emit(&EditorEvent::StateChanged { from, to });
        }
    }

    pub fn change_mode(&mut self, name: &str) -> Result<(), EditorError> {
        self.modes.change_mode(name)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event. Pointer positions are in screen space.
    ///
    /// Key presses go to the shortcut table first; unbound keys fall
    /// through to the active state. Returns whether the event was used.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<bool, EditorError> {
        match event {
            InputEvent::Key(press) => self.handle_key(press),
            InputEvent::Scroll { dx, dy, zoom } => {
                self.viewport.pan_by(-*dx, -*dy);
                if *zoom != 1.0 {
                    self.viewport.set_zoom(self.viewport.zoom * *zoom);
                }
                Ok(true)
            }
            _ => {
                let event = match event.position() {
                    Some((x, y)) => {
                        let (wx, wy) = self.viewport.screen_to_world(x, y);
                        event.with_position(wx, wy)
                    }
                    None => event.clone(),
                };
                self.dispatch_to_state(&event)
            }
        }
    }

    fn handle_key(&mut self, press: &KeyPress) -> Result<bool, EditorError> {
        self.events.emit(&EditorEvent::KeyDown(press.clone()));
        match self.shortcuts.resolve(press) {
            Some(action) => {
                self.run_action(action)?;
                Ok(true)
            }
            None => self.dispatch_to_state(&InputEvent::Key(press.clone())),
        }
    }

    fn dispatch_to_state(&mut self, event: &InputEvent) -> Result<bool, EditorError> {
        let scene = self.engine.scene();
        let ctx = StateContext {
            scene,
            selection: &self.selection,
            config: &self.config,
        };
        let Some(state) = self.modes.mode_mut().current_mut() else {
            return Ok(false);
        };
        let outcome = state.handle(event, &ctx);
        let consumed = outcome.consumed;
        self.apply_outcome(outcome)?;
        Ok(consumed)
    }

    fn apply_outcome(&mut self, outcome: ToolOutcome) -> Result<(), EditorError> {
        let ToolOutcome {
            mut changes,
            create,
            mut select,
            hover,
            next_state,
            ..
        } = outcome;

        if let Some(creation) = create {
            let node = self.engine.create_element(creation.node_type, creation.props);
            select = Some(vec![node.id]);
            changes.push(ChangeRecord::add(creation.parent, node));
        }
        self.transact(changes)?;

        if let Some(ids) = select {
            self.set_selected_nodes(ids);
        }
        if let Some(hovered) = hover
            && hovered != self.selection.hovered(self.engine.scene())
        {
            self.set_hover_node(hovered);
        }
        if let Some(next) = next_state
            && &next != self.current_state()
        {
            self.change_state(&next)?;
        }
        Ok(())
    }

    pub fn run_action(&mut self, action: ShortcutAction) -> Result<(), EditorError> {
        log::trace!("run {action:?}");
        match action {
            ShortcutAction::SelectTool => self.change_state(&StateId::DEFAULT)?,
            ShortcutAction::RectangleTool => self.change_state(&StateId::CREATE_RECTANGLE)?,
            ShortcutAction::FrameTool => self.change_state(&StateId::CREATE_FRAME)?,
            ShortcutAction::Delete => {
                self.delete_selected()?;
            }
            ShortcutAction::SelectAll => {
                self.select_all();
            }
            ShortcutAction::Undo => {
                self.undo()?;
            }
            ShortcutAction::Redo => {
                self.redo()?;
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selected()?;
            }
            ShortcutAction::BringForward => {
                self.bring_forward()?;
            }
            ShortcutAction::SendBackward => {
                self.send_backward()?;
            }
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.reset_view(),
        }
        Ok(())
    }

    // ─── Edit commands ───────────────────────────────────────────────────

    /// Selected nodes that are not inside another selected node, and are
    /// not pages or the document.
    fn selection_roots(&self) -> Vec<NodeId> {
        let scene = self.scene();
        let selected = self.selected_nodes();
        selected
            .iter()
            .copied()
            .filter(|id| {
                scene
                    .get_node_by_id(*id)
                    .is_some_and(|n| n.node_type().is_visual())
            })
            .filter(|id| {
                !selected
                    .iter()
                    .any(|other| other != id && scene.is_ancestor_of(*other, *id))
            })
            .collect()
    }

    /// Delete every selected node and its descendants as one transaction:
    /// one Delete record per node, children before parents. The selection
    /// is cleared.
    pub fn delete_selected(&mut self) -> Result<bool, EditorError> {
        let scene = self.scene();
        let mut records = Vec::new();
        for root in self.selection_roots() {
            records.extend(scene.subtree_ids(root).into_iter().rev().map(ChangeRecord::delete));
        }
        let committed = self.transact(records)?;
        self.set_selected_nodes(Vec::new());
        Ok(committed)
    }

    /// Copy each selected subtree with fresh ids, offset, right after its
    /// original. The copies become the selection.
    pub fn duplicate_selected(&mut self) -> Result<bool, EditorError> {
        let mut roots: Vec<_> = self
            .selection_roots()
            .into_iter()
            .filter_map(|id| self.scene().slot_of(id).map(|slot| (id, slot)))
            .collect();
        // later siblings first so earlier insert positions stay valid
        roots.sort_by(|a, b| b.1.index.cmp(&a.1.index));

        let mut records = Vec::new();
        let mut copies = Vec::new();
        for (id, slot) in roots {
            let Some(subtree) = self.scene().subtree(id) else {
                continue;
            };
            let copy = self.copy_subtree(subtree);
            copies.push(copy.node.id);
            records.push(ChangeRecord::Add {
                parent: slot.parent,
                index: Some(slot.index + 1),
                subtree: copy,
            });
        }
        copies.reverse();
        let committed = self.transact(records)?;
        self.set_selected_nodes(copies);
        Ok(committed)
    }

    fn copy_subtree(&mut self, subtree: Subtree) -> Subtree {
        let Subtree { mut node, children } = subtree;
        node.id = self.engine.generate_id(node.node_type());
        let g = &mut node.geometry;
        g.x += DUPLICATE_OFFSET;
        g.y += DUPLICATE_OFFSET;
        let (tx, ty) = g.transform.translation();
        g.transform = g
            .transform
            .with_translation(tx + DUPLICATE_OFFSET, ty + DUPLICATE_OFFSET);
        Subtree {
            node,
            children: children.into_iter().map(|c| self.copy_subtree(c)).collect(),
        }
    }

    /// Move each selected node one step up among its siblings.
    pub fn bring_forward(&mut self) -> Result<bool, EditorError> {
        let records = self.reorder_records(true);
        self.transact(records)
    }

    /// Move each selected node one step down among its siblings.
    pub fn send_backward(&mut self) -> Result<bool, EditorError> {
        let records = self.reorder_records(false);
        self.transact(records)
    }

    /// Selected siblings move as a block: none jumps over another selected
    /// sibling.
    fn reorder_records(&self, forward: bool) -> Vec<ChangeRecord> {
        let scene = self.scene();
        let mut by_parent: IndexMap<NodeId, Vec<usize>> = IndexMap::new();
        for id in self.selection_roots() {
            if let Some(slot) = scene.slot_of(id) {
                by_parent.entry(slot.parent).or_default().push(slot.index);
            }
        }

        let mut records = Vec::new();
        for (parent, mut indices) in by_parent {
            let siblings = scene.children_of(parent);
            if forward {
                indices.sort_unstable_by(|a, b| b.cmp(a));
                let mut ceiling = siblings.len();
                for index in indices {
                    let target = (index + 1).min(ceiling.saturating_sub(1));
                    if target > index {
                        records.push(ChangeRecord::move_to(siblings[index], parent, Some(target)));
                        ceiling = target;
                    } else {
                        ceiling = index;
                    }
                }
            } else {
                indices.sort_unstable();
                let mut floor = 0;
                for index in indices {
                    let target = index.saturating_sub(1).max(floor);
                    if target < index {
                        records.push(ChangeRecord::move_to(siblings[index], parent, Some(target)));
                        floor = target + 1;
                    } else {
                        floor = index + 1;
                    }
                }
            }
        }
        records
    }

    /// Write one property. Position and rotation edits also rewrite the
    /// transform so both stay consistent, and a position edit carries the
    /// node's contents along.
    pub fn set_property(
        &mut self,
        id: NodeId,
        path: PropertyPath,
        value: impl Into<PropertyValue>,
    ) -> Result<bool, EditorError> {
        let value = value.into();
        let mut records = Vec::with_capacity(2);
        if let Some(node) = self.scene().get_node_by_id(id) {
            let g = &node.geometry;
            let (tx, ty) = g.transform.translation();
            let (synced, offset) = match (path, value.as_number()) {
                (PropertyPath::X, Some(x)) => (Some(g.transform.with_translation(x, ty)), (x - g.x, 0.0)),
                (PropertyPath::Y, Some(y)) => (Some(g.transform.with_translation(tx, y)), (0.0, y - g.y)),
                (PropertyPath::Rotation, Some(r)) => (Some(g.transform.with_rotation(r)), (0.0, 0.0)),
                _ => (None, (0.0, 0.0)),
            };
            if let Some(transform) = synced {
                records.push(ChangeRecord::set(id, PropertyPath::Transform, transform));
            }
            if offset != (0.0, 0.0) {
                records.extend(content_move_records(self.scene(), id, offset.0, offset.1));
            }
        }
        records.insert(0, ChangeRecord::set(id, path, value));
        self.transact(records)
    }

    /// Inspector edit addressed as `"<node id>.<property>"`, e.g.
    /// `"rectangle_4.cornerRadius"`.
    pub fn apply_property_edit(
        &mut self,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<bool, EditorError> {
        let Some((id, path)) = key.rsplit_once('.') else {
            return Err(EditorError::InvalidPropertyKey(key.to_string()));
        };
        if id.is_empty() {
            return Err(EditorError::InvalidPropertyKey(key.to_string()));
        }
        let path: PropertyPath = path.parse()?;
        self.set_property(NodeId::intern(id), path, value)
    }

    /// Translate the given nodes (and their contents) in one step.
    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f32, dy: f32) -> Result<bool, EditorError> {
        let records = move_records(self.scene(), ids, dx, dy);
        self.transact(records)
    }

    /// Create a node of `node_type` under `parent` in one step and return
    /// its id.
    pub fn create_node(
        &mut self,
        parent: NodeId,
        node_type: NodeType,
        props: NodeProps,
    ) -> Result<NodeId, EditorError> {
        let node = self.engine.create_element(node_type, props);
        let id = node.id;
        self.transact(vec![ChangeRecord::add(parent, node)])?;
        Ok(id)
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    /// Append an empty page and switch to it.
    pub fn create_empty_page(&mut self) -> Result<NodeId, EditorError> {
        let name = format!("Page {}", self.pages().len() + 1);
        let root = self.scene().root_id();
        let page = self.create_node(root, NodeType::Page, NodeProps::default().with_name(name))?;
        self.switch_page(page)?;
        Ok(page)
    }

    /// Delete a page. The last remaining page cannot be deleted.
    pub fn delete_page(&mut self, page: NodeId) -> Result<(), EditorError> {
        match self.scene().get_node_by_id(page) {
            Some(node) if node.node_type() == NodeType::Page => {}
            Some(_) => return Err(SceneError::NotAPage(page).into()),
            None => return Err(SceneError::UnknownNode(page).into()),
        }
        self.transact(vec![ChangeRecord::delete(page)])?;
        Ok(())
    }

    /// Make `page` current. Not an undoable edit.
    pub fn switch_page(&mut self, page: NodeId) -> Result<bool, EditorError> {
        if !self.engine.switch_page(page)? {
            return Ok(false);
        }
        self.on_page_switched();
        Ok(true)
    }

    fn on_page_switched(&mut self) {
        self.set_selected_nodes(Vec::new());
        if self.selection.has_hover() {
            self.set_hover_node(None);
        }
        let page = self.current_page();
        log::debug!("switched to page {page}");
        self.events.emit(&EditorEvent::PageChanged { page });
    }

    pub fn set_background_color(&mut self, color: Rgba8) -> Result<bool, EditorError> {
        let page = self.current_page();
        self.transact(vec![ChangeRecord::set(page, PropertyPath::Background, color)])
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_viewport_position(&mut self, x: f32, y: f32) {
        self.viewport.set_position(x, y);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.viewport.set_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        let zoom = self.viewport.zoom * self.config.zoom.step;
        self.viewport.set_zoom(zoom);
    }

    pub fn zoom_out(&mut self) {
        let zoom = self.viewport.zoom / self.config.zoom.step;
        self.viewport.set_zoom(zoom);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }
}
