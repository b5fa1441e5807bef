//! Interaction states of the `Editor` mode.
//!
//! States never touch the scene. They read it through the context and
//! describe what should happen in a `ToolOutcome`; gesture previews stay
//! inside the state until the gesture is confirmed.
//!
//! ## Modifier behaviors
//!
//! | Modifier  | Select                               | Create shape      |
//! |-----------|--------------------------------------|-------------------|
//! | **Shift** | Toggle on click, add to marquee      | Square constraint |

use crate::input::InputEvent;
use crate::modes::{Creation, EditorState, Preview, StateContext, StateId, ToolOutcome};
use kurbo::{Point, Rect};
use zg_core::{ChangeRecord, NodeId, NodeProps, NodeType, Paint, PropertyPath, Rgba8, Scene};
use zg_render::hit::{hit_test, hit_test_rect};

/// Pointer travel (page units) below which a press counts as a click.
const CLICK_SLOP: f64 = 1.0;

fn drag_rect(origin: (f32, f32), current: (f32, f32)) -> Rect {
    Rect::from_points(
        Point::new(f64::from(origin.0), f64::from(origin.1)),
        Point::new(f64::from(current.0), f64::from(current.1)),
    )
}

fn is_click(rect: &Rect) -> bool {
    rect.width() < CLICK_SLOP && rect.height() < CLICK_SLOP
}

// ─── Select ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Pressed on a node; moving drags `ids`.
    Drag {
        origin: (f32, f32),
        current: (f32, f32),
        ids: Vec<NodeId>,
    },
    /// Pressed on empty canvas.
    Marquee {
        origin: (f32, f32),
        current: (f32, f32),
        /// Selection kept when Shift was held.
        base: Vec<NodeId>,
    },
}

/// The default state: click/marquee selection, hover and move-by-drag.
#[derive(Debug, Default)]
pub struct SelectState {
    gesture: Gesture,
}

impl SelectState {
    fn press(&mut self, at: (f32, f32), shift: bool, ctx: &StateContext<'_>) -> ToolOutcome {
        let current = ctx.selection.selected(ctx.scene);
        let mut outcome = ToolOutcome::consumed();

        let Some(hit) = hit_test(ctx.scene, at.0, at.1) else {
            let base = if shift { current } else { Vec::new() };
            if !shift {
                outcome.select = Some(Vec::new());
            }
            self.gesture = Gesture::Marquee {
                origin: at,
                current: at,
                base,
            };
            return outcome;
        };

        let selection = if shift {
            let mut next = ctx.selection.clone();
            next.toggle(hit, ctx.scene);
            next.selected(ctx.scene)
        } else if current.contains(&hit) {
            // keep a multi-selection intact so it can be dragged
            current.clone()
        } else {
            vec![hit]
        };

        if selection != current {
            outcome.select = Some(selection.clone());
        }
        let ids = if selection.contains(&hit) { selection } else { Vec::new() };
        self.gesture = Gesture::Drag {
            origin: at,
            current: at,
            ids,
        };
        outcome
    }

    fn release(&mut self, at: (f32, f32), ctx: &StateContext<'_>) -> ToolOutcome {
        match std::mem::take(&mut self.gesture) {
            Gesture::Drag { origin, ids, .. } => {
                let (dx, dy) = (at.0 - origin.0, at.1 - origin.1);
                if is_click(&drag_rect(origin, at)) || ids.is_empty() {
                    return ToolOutcome::consumed();
                }
                ToolOutcome {
                    changes: move_records(ctx.scene, &ids, dx, dy),
                    consumed: true,
                    ..ToolOutcome::default()
                }
            }
            Gesture::Marquee {
                origin,
                base,
                ..
            } => {
                let area = drag_rect(origin, at);
                if is_click(&area) {
                    return ToolOutcome::consumed();
                }
                let mut selection = base;
                for id in hit_test_rect(ctx.scene, area) {
                    if !selection.contains(&id) {
                        selection.push(id);
                    }
                }
                ToolOutcome {
                    select: Some(selection),
                    consumed: true,
                    ..ToolOutcome::default()
                }
            }
            Gesture::Idle => ToolOutcome::ignored(),
        }
    }
}

impl EditorState for SelectState {
    fn id(&self) -> StateId {
        StateId::DEFAULT
    }

    fn exit(&mut self) {
        self.gesture = Gesture::Idle;
    }

    fn handle(&mut self, event: &InputEvent, ctx: &StateContext<'_>) -> ToolOutcome {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => self.press((*x, *y), modifiers.shift, ctx),
            InputEvent::PointerMove { x, y, .. } => match &mut self.gesture {
                Gesture::Drag { current, .. } | Gesture::Marquee { current, .. } => {
                    *current = (*x, *y);
                    ToolOutcome::consumed()
                }
                Gesture::Idle => ToolOutcome {
                    hover: Some(hit_test(ctx.scene, *x, *y)),
                    ..ToolOutcome::default()
                },
            },
            InputEvent::PointerUp { x, y, .. } => self.release((*x, *y), ctx),
            InputEvent::Key(press) if press.key == "Escape" => {
                if matches!(self.gesture, Gesture::Idle) {
                    ToolOutcome {
                        select: Some(Vec::new()),
                        consumed: true,
                        ..ToolOutcome::default()
                    }
                } else {
                    // abandon the drag; nothing was written
                    self.gesture = Gesture::Idle;
                    ToolOutcome::consumed()
                }
            }
            _ => ToolOutcome::ignored(),
        }
    }

    fn preview(&self) -> Option<Preview> {
        match &self.gesture {
            Gesture::Drag {
                origin,
                current,
                ids,
            } if !ids.is_empty() => Some(Preview::Move {
                ids: ids.clone(),
                dx: current.0 - origin.0,
                dy: current.1 - origin.1,
            }),
            Gesture::Marquee { origin, current, .. } => {
                Some(Preview::Marquee(drag_rect(*origin, *current)))
            }
            _ => None,
        }
    }
}

/// Modify records translating `ids` and everything inside them by
/// `(dx, dy)`. Locked nodes stay put, together with their contents,
/// whether they are moved directly or sit inside a moved node.
/// Each node appears once even if it is also inside another moved node.
pub fn move_records(scene: &Scene, ids: &[NodeId], dx: f32, dy: f32) -> Vec<ChangeRecord> {
    let mut moved: Vec<NodeId> = Vec::new();
    for id in ids {
        if scene.get_node_by_id(*id).is_some_and(|n| !n.locked) {
            collect_unlocked(scene, *id, &mut moved);
        }
    }
    translate_records(scene, &moved, dx, dy)
}

/// Records carrying the contents of `id` along when `id` itself is
/// shifted by `(dx, dy)` some other way. Locked children stay put.
pub fn content_move_records(scene: &Scene, id: NodeId, dx: f32, dy: f32) -> Vec<ChangeRecord> {
    let mut moved = Vec::new();
    for child in scene.children_of(id) {
        if scene.get_node_by_id(child).is_some_and(|n| !n.locked) {
            collect_unlocked(scene, child, &mut moved);
        }
    }
    translate_records(scene, &moved, dx, dy)
}

fn collect_unlocked(scene: &Scene, id: NodeId, out: &mut Vec<NodeId>) {
    if !out.contains(&id) {
        out.push(id);
    }
    for child in scene.children_of(id) {
        if scene.get_node_by_id(child).is_some_and(|n| !n.locked) {
            collect_unlocked(scene, child, out);
        }
    }
}

fn translate_records(scene: &Scene, ids: &[NodeId], dx: f32, dy: f32) -> Vec<ChangeRecord> {
    let mut records = Vec::with_capacity(ids.len() * 3);
    for id in ids {
        let Some(node) = scene.get_node_by_id(*id) else {
            continue;
        };
        let g = &node.geometry;
        let (tx, ty) = g.transform.translation();
        records.push(ChangeRecord::set(*id, PropertyPath::X, g.x + dx));
        records.push(ChangeRecord::set(*id, PropertyPath::Y, g.y + dy));
        records.push(ChangeRecord::set(
            *id,
            PropertyPath::Transform,
            g.transform.with_translation(tx + dx, ty + dy),
        ));
    }
    records
}

// ─── Create shape ────────────────────────────────────────────────────────

/// Drag out a rectangle or a frame. A plain click places a default-sized
/// node. Either way control returns to the default state afterwards.
#[derive(Debug)]
pub struct CreateShapeState {
    id: StateId,
    node_type: NodeType,
    drag: Option<((f32, f32), (f32, f32))>,
    square: bool,
}

impl CreateShapeState {
    pub fn new(id: StateId, node_type: NodeType) -> Self {
        Self {
            id,
            node_type,
            drag: None,
            square: false,
        }
    }

    fn shape_rect(&self) -> Option<Rect> {
        let (origin, current) = self.drag?;
        let mut rect = drag_rect(origin, current);
        if self.square {
            let side = rect.width().max(rect.height());
            let sx = if current.0 < origin.0 { -side } else { side };
            let sy = if current.1 < origin.1 { -side } else { side };
            let o = Point::new(f64::from(origin.0), f64::from(origin.1));
            rect = Rect::from_points(o, Point::new(o.x + sx, o.y + sy));
        }
        Some(rect)
    }

    /// Topmost frame under the press point, else the current page.
    fn parent_at(&self, ctx: &StateContext<'_>, at: (f32, f32)) -> NodeId {
        let page = ctx.scene.current_page();
        let Some(mut id) = hit_test(ctx.scene, at.0, at.1) else {
            return page;
        };
        loop {
            match ctx.scene.get_node_by_id(id) {
                Some(node) if node.node_type() == NodeType::Frame => return id,
                Some(_) => match ctx.scene.parent_of(id) {
                    Some(parent) if parent != page => id = parent,
                    _ => return page,
                },
                None => return page,
            }
        }
    }

    fn finish(&mut self, at: (f32, f32), ctx: &StateContext<'_>) -> ToolOutcome {
        let Some((origin, _)) = self.drag else {
            return ToolOutcome::ignored();
        };
        self.drag = Some((origin, at));
        let rect = self.shape_rect().unwrap_or_default();
        self.drag = None;

        let size = ctx.config.default_size;
        let (x, y, w, h) = if is_click(&rect) {
            (origin.0, origin.1, size, size)
        } else {
            (
                rect.x0 as f32,
                rect.y0 as f32,
                rect.width() as f32,
                rect.height() as f32,
            )
        };
        let fill = match self.node_type {
            NodeType::Frame => Rgba8::WHITE,
            _ => ctx.config.default_fill,
        };
        ToolOutcome {
            create: Some(Creation {
                node_type: self.node_type,
                parent: self.parent_at(ctx, origin),
                props: NodeProps::rect(x, y, w, h).with_fill(Paint::solid(fill)),
            }),
            next_state: Some(StateId::DEFAULT),
            consumed: true,
            ..ToolOutcome::default()
        }
    }
}

impl EditorState for CreateShapeState {
    fn id(&self) -> StateId {
        self.id.clone()
    }

    fn exit(&mut self) {
        self.drag = None;
        self.square = false;
    }

    fn handle(&mut self, event: &InputEvent, ctx: &StateContext<'_>) -> ToolOutcome {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.drag = Some(((*x, *y), (*x, *y)));
                self.square = modifiers.shift;
                ToolOutcome::consumed()
            }
            InputEvent::PointerMove { x, y, modifiers } => match &mut self.drag {
                Some((_, current)) => {
                    *current = (*x, *y);
                    self.square = modifiers.shift;
                    ToolOutcome::consumed()
                }
                None => ToolOutcome::ignored(),
            },
            InputEvent::PointerUp { x, y, modifiers } => {
                if self.drag.is_some() {
                    self.square = modifiers.shift;
                }
                self.finish((*x, *y), ctx)
            }
            InputEvent::Key(press) if press.key == "Escape" => {
                self.drag = None;
                ToolOutcome {
                    next_state: Some(StateId::DEFAULT),
                    consumed: true,
                    ..ToolOutcome::default()
                }
            }
            _ => ToolOutcome::ignored(),
        }
    }

    fn preview(&self) -> Option<Preview> {
        self.shape_rect().map(|rect| Preview::Shape {
            node_type: self.node_type,
            rect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::input::Modifiers;
    use crate::selection::SelectionState;
    use zg_core::apply_transaction;

    struct Fixture {
        scene: Scene,
        selection: SelectionState,
        config: EditorConfig,
    }

    impl Fixture {
        /// Two 100×100 boxes at (0,0) and (200,0).
        fn new() -> (Self, NodeId, NodeId) {
            let mut scene = Scene::new();
            let page = scene.current_page();
            let a = scene.create_element(NodeType::Rectangle, NodeProps::rect(0.0, 0.0, 100.0, 100.0));
            let b = scene.create_element(NodeType::Rectangle, NodeProps::rect(200.0, 0.0, 100.0, 100.0));
            let (ia, ib) = (a.id, b.id);
            apply_transaction(&mut scene, vec![ChangeRecord::add(page, a), ChangeRecord::add(page, b)])
                .unwrap();
            let fixture = Self {
                scene,
                selection: SelectionState::default(),
                config: EditorConfig::default(),
            };
            (fixture, ia, ib)
        }

        fn ctx(&self) -> StateContext<'_> {
            StateContext {
                scene: &self.scene,
                selection: &self.selection,
                config: &self.config,
            }
        }
    }

    fn shift_down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            modifiers: Modifiers::SHIFT,
        }
    }

    #[test]
    fn click_selects_hit_node() {
        let (fx, a, _) = Fixture::new();
        let mut state = SelectState::default();
        let out = state.handle(&InputEvent::pointer_down(50.0, 50.0), &fx.ctx());
        assert_eq!(out.select, Some(vec![a]));
        let up = state.handle(&InputEvent::pointer_up(50.0, 50.0), &fx.ctx());
        assert!(up.changes.is_empty());
    }

    #[test]
    fn shift_click_toggles() {
        let (mut fx, a, b) = Fixture::new();
        fx.selection.set([a], &fx.scene);
        let mut state = SelectState::default();
        let out = state.handle(&shift_down(250.0, 50.0), &fx.ctx());
        assert_eq!(out.select, Some(vec![a, b]));

        fx.selection.set([a, b], &fx.scene);
        let mut state = SelectState::default();
        let out = state.handle(&shift_down(50.0, 50.0), &fx.ctx());
        assert_eq!(out.select, Some(vec![b]));
    }

    #[test]
    fn drag_moves_selection_on_release_only() {
        let (mut fx, a, b) = Fixture::new();
        fx.selection.set([a, b], &fx.scene);
        let mut state = SelectState::default();
        let down = state.handle(&InputEvent::pointer_down(50.0, 50.0), &fx.ctx());
        assert_eq!(down.select, None);

        let mv = state.handle(&InputEvent::pointer_move(60.0, 70.0), &fx.ctx());
        assert!(mv.changes.is_empty());
        assert_eq!(
            state.preview(),
            Some(Preview::Move {
                ids: vec![a, b],
                dx: 10.0,
                dy: 20.0
            })
        );

        let up = state.handle(&InputEvent::pointer_up(60.0, 70.0), &fx.ctx());
        assert_eq!(up.changes.len(), 6);
        apply_transaction(&mut fx.scene, up.changes).unwrap();
        let g = fx.scene.get_node_by_id(b).unwrap().geometry;
        assert_eq!((g.x, g.y), (210.0, 20.0));
        assert_eq!(g.transform.translation(), (210.0, 20.0));
        assert_eq!(state.preview(), None);
    }

    #[test]
    fn escape_cancels_drag_without_changes() {
        let (fx, _, _) = Fixture::new();
        let mut state = SelectState::default();
        state.handle(&InputEvent::pointer_down(50.0, 50.0), &fx.ctx());
        state.handle(&InputEvent::pointer_move(90.0, 90.0), &fx.ctx());
        let esc = state.handle(&InputEvent::key("Escape", Modifiers::NONE), &fx.ctx());
        assert!(esc.consumed);
        assert_eq!(esc.select, None);
        let up = state.handle(&InputEvent::pointer_up(90.0, 90.0), &fx.ctx());
        assert!(up.changes.is_empty());
    }

    #[test]
    fn marquee_selects_intersecting_nodes() {
        let (fx, a, b) = Fixture::new();
        let mut state = SelectState::default();
        let down = state.handle(&InputEvent::pointer_down(-10.0, 150.0), &fx.ctx());
        assert_eq!(down.select, Some(vec![]));
        state.handle(&InputEvent::pointer_move(250.0, 50.0), &fx.ctx());
        assert!(matches!(state.preview(), Some(Preview::Marquee(_))));
        let up = state.handle(&InputEvent::pointer_up(250.0, 50.0), &fx.ctx());
        assert_eq!(up.select, Some(vec![a, b]));
    }

    #[test]
    fn hover_follows_pointer() {
        let (fx, a, _) = Fixture::new();
        let mut state = SelectState::default();
        let over = state.handle(&InputEvent::pointer_move(10.0, 10.0), &fx.ctx());
        assert_eq!(over.hover, Some(Some(a)));
        let off = state.handle(&InputEvent::pointer_move(150.0, 10.0), &fx.ctx());
        assert_eq!(off.hover, Some(None));
    }

    #[test]
    fn locked_nodes_are_not_moved() {
        let (mut fx, a, b) = Fixture::new();
        apply_transaction(&mut fx.scene, vec![ChangeRecord::set(b, PropertyPath::Locked, true)]).unwrap();
        let records = move_records(&fx.scene, &[a, b], 5.0, 5.0);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.target() == a));
    }

    /// Frame at the origin holding a free child and a locked one.
    fn frame_with_locked_child() -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let page = scene.current_page();
        let frame = scene.create_element(NodeType::Frame, NodeProps::rect(0.0, 0.0, 300.0, 300.0));
        let free = scene.create_element(NodeType::Rectangle, NodeProps::rect(10.0, 10.0, 20.0, 20.0));
        let pinned = scene.create_element(
            NodeType::Rectangle,
            NodeProps {
                locked: Some(true),
                ..NodeProps::rect(50.0, 50.0, 20.0, 20.0)
            },
        );
        let ids = (frame.id, free.id, pinned.id);
        apply_transaction(
            &mut scene,
            vec![
                ChangeRecord::add(page, frame),
                ChangeRecord::add(ids.0, free),
                ChangeRecord::add(ids.0, pinned),
            ],
        )
        .unwrap();
        (scene, ids.0, ids.1, ids.2)
    }

    #[test]
    fn locked_content_stays_when_its_frame_moves() {
        let (scene, frame, free, pinned) = frame_with_locked_child();
        let records = move_records(&scene, &[frame], 5.0, 5.0);
        let targets: Vec<NodeId> = records.iter().map(ChangeRecord::target).collect();
        assert_eq!(targets.len(), 6);
        assert!(targets.contains(&frame) && targets.contains(&free));
        assert!(!targets.contains(&pinned));
    }

    #[test]
    fn content_moves_without_its_container() {
        let (scene, frame, free, pinned) = frame_with_locked_child();
        let records = content_move_records(&scene, frame, 5.0, 0.0);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.target() == free));
        assert!(content_move_records(&scene, pinned, 5.0, 0.0).is_empty());
    }

    #[test]
    fn drag_out_rectangle() {
        let (fx, _, _) = Fixture::new();
        let mut state = CreateShapeState::new(StateId::CREATE_RECTANGLE, NodeType::Rectangle);
        state.handle(&InputEvent::pointer_down(400.0, 400.0), &fx.ctx());
        state.handle(&InputEvent::pointer_move(350.0, 450.0), &fx.ctx());
        assert!(matches!(state.preview(), Some(Preview::Shape { .. })));
        let out = state.handle(&InputEvent::pointer_up(350.0, 450.0), &fx.ctx());

        let creation = out.create.unwrap();
        assert_eq!(creation.node_type, NodeType::Rectangle);
        assert_eq!(creation.parent, fx.scene.current_page());
        assert_eq!(
            (creation.props.x, creation.props.y, creation.props.width, creation.props.height),
            (Some(350.0), Some(400.0), Some(50.0), Some(50.0))
        );
        assert_eq!(out.next_state, Some(StateId::DEFAULT));
        assert_eq!(state.preview(), None);
    }

    #[test]
    fn click_places_default_size() {
        let (fx, _, _) = Fixture::new();
        let mut state = CreateShapeState::new(StateId::CREATE_FRAME, NodeType::Frame);
        state.handle(&InputEvent::pointer_down(500.0, 500.0), &fx.ctx());
        let out = state.handle(&InputEvent::pointer_up(500.0, 500.0), &fx.ctx());
        let props = out.create.unwrap().props;
        assert_eq!((props.width, props.height), (Some(100.0), Some(100.0)));
    }

    #[test]
    fn escape_cancels_creation() {
        let (fx, _, _) = Fixture::new();
        let mut state = CreateShapeState::new(StateId::CREATE_RECTANGLE, NodeType::Rectangle);
        state.handle(&InputEvent::pointer_down(400.0, 400.0), &fx.ctx());
        state.handle(&InputEvent::pointer_move(450.0, 450.0), &fx.ctx());
        let esc = state.handle(&InputEvent::key("Escape", Modifiers::NONE), &fx.ctx());
        assert!(esc.create.is_none());
        assert_eq!(esc.next_state, Some(StateId::DEFAULT));
        let up = state.handle(&InputEvent::pointer_up(450.0, 450.0), &fx.ctx());
        assert!(up.create.is_none());
    }

    #[test]
    fn shapes_nest_inside_frames() {
        let (mut fx, _, _) = Fixture::new();
        let page = fx.scene.current_page();
        let frame = fx
            .scene
            .create_element(NodeType::Frame, NodeProps::rect(0.0, 300.0, 200.0, 200.0));
        let frame_id = frame.id;
        apply_transaction(&mut fx.scene, vec![ChangeRecord::add(page, frame)]).unwrap();

        let mut state = CreateShapeState::new(StateId::CREATE_RECTANGLE, NodeType::Rectangle);
        state.handle(&InputEvent::pointer_down(20.0, 320.0), &fx.ctx());
        let out = state.handle(&InputEvent::pointer_up(60.0, 360.0), &fx.ctx());
        assert_eq!(out.create.unwrap().parent, frame_id);
    }
}
