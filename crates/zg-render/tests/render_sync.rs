//! Integration tests: scene changes → primitive calls, checked against a
//! backend that records every call instead of drawing.

use kurbo::Rect;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use zg_core::*;
use zg_render::*;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(u32),
    Update(u32),
    Order(u32, usize),
    Destroy(u32),
}

#[derive(Default)]
struct RecordingBackend {
    next: u32,
    calls: Vec<Call>,
    props: HashMap<u32, PrimitiveProps<String>>,
    orders: HashMap<u32, usize>,
}

impl RecordingBackend {
    fn creates(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Create(_))).count()
    }
}

impl RenderBackend for RecordingBackend {
    type Handle = u32;
    type Texture = String;

    fn create_primitive(&mut self) -> u32 {
        self.next += 1;
        self.calls.push(Call::Create(self.next));
        self.next
    }

    fn update_primitive(&mut self, handle: u32, props: &PrimitiveProps<String>) {
        self.calls.push(Call::Update(handle));
        self.props.insert(handle, props.clone());
    }

    fn set_order(&mut self, handle: u32, order: usize) {
        self.calls.push(Call::Order(handle, order));
        self.orders.insert(handle, order);
    }

    fn destroy_primitive(&mut self, handle: u32) {
        self.calls.push(Call::Destroy(handle));
        self.props.remove(&handle);
        self.orders.remove(&handle);
    }
}

/// Resolves `foo.png` to the texture name `tex:foo.png`.
struct Textures;

impl AssetResolver<String> for Textures {
    fn resolve(&mut self, image: &ImageRef) -> Option<String> {
        Some(format!("tex:{}", image.as_str()))
    }
}

fn sync() -> RenderSync<RecordingBackend, Textures> {
    RenderSync::new(RecordingBackend::default(), Textures)
}

fn add(scene: &mut Scene, parent: NodeId, node_type: NodeType, props: NodeProps) -> NodeId {
    let node = scene.create_element(node_type, props);
    let id = node.id;
    apply_transaction(scene, vec![ChangeRecord::add(parent, node)]).unwrap();
    id
}

#[test]
fn red_rectangle_syncs_unit_color_and_local_rect() {
    let mut scene = Scene::new();
    let page = scene.current_page();
    let id = add(
        &mut scene,
        page,
        NodeType::Rectangle,
        NodeProps::rect(10.0, 10.0, 100.0, 50.0).with_fill(Paint::solid(Rgba8::new(255, 0, 0, 255))),
    );

    let mut sync = sync();
    let handle = sync
        .create_render_node(scene.get_node_by_id(id).unwrap())
        .unwrap();
    let props = &sync.backend().props[&handle];

    assert_eq!(props.fill, Some(ResolvedPaint::Solid([1.0, 0.0, 0.0, 1.0])));
    assert_eq!(props.rect, Rect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(props.transform, Transform::translate(10.0, 10.0));
    assert!(props.visible);
    assert_eq!(props.stroke, None);
}

#[test]
fn image_fill_and_first_stroke_only() {
    let mut scene = Scene::new();
    let page = scene.current_page();
    let mut props = NodeProps::rect(0.0, 0.0, 10.0, 10.0).with_fill(Paint::image("foo.png"));
    props.stroke = Some(StrokeProps {
        stroke_weight: 3.0,
        stroke_paints: [Paint::solid(Rgba8::BLACK), Paint::solid(Rgba8::WHITE)]
            .into_iter()
            .collect(),
    });
    let id = add(&mut scene, page, NodeType::Rectangle, props);

    let mut sync = sync();
    let handle = sync
        .create_render_node(scene.get_node_by_id(id).unwrap())
        .unwrap();
    let props = &sync.backend().props[&handle];
    assert_eq!(props.fill, Some(ResolvedPaint::Texture("tex:foo.png".to_string())));
    assert_eq!(
        props.stroke,
        Some(ResolvedStroke {
            weight: 3.0,
            paint: ResolvedPaint::Solid([0.0, 0.0, 0.0, 1.0]),
        })
    );
}

#[test]
fn sync_scene_orders_depth_first_and_drops_orphans() {
    let mut scene = Scene::new();
    let page = scene.current_page();
    let frame = add(&mut scene, page, NodeType::Frame, NodeProps::rect(0.0, 0.0, 300.0, 300.0));
    let inner = add(&mut scene, frame, NodeType::Rectangle, NodeProps::rect(10.0, 10.0, 10.0, 10.0));
    let top = add(&mut scene, page, NodeType::Text, NodeProps::rect(0.0, 0.0, 50.0, 20.0));

    let mut sync = sync();
    sync.sync_scene(&scene);
    assert_eq!(sync.len(), 3);

    let order = |sync: &RenderSync<RecordingBackend, Textures>, id| {
        sync.backend().orders[&sync.handle_of(id).unwrap()]
    };
    assert_eq!(
        [order(&sync, frame), order(&sync, inner), order(&sync, top)],
        [0, 1, 2]
    );

    let top_handle = sync.handle_of(top).unwrap();
    apply_transaction(&mut scene, vec![ChangeRecord::delete(top)]).unwrap();
    sync.sync_scene(&scene);
    assert_eq!(sync.len(), 2);
    assert!(sync.backend().calls.contains(&Call::Destroy(top_handle)));
}

#[test]
fn change_set_updates_without_reallocating() {
    let mut scene = Scene::new();
    let page = scene.current_page();
    let a = add(&mut scene, page, NodeType::Rectangle, NodeProps::rect(0.0, 0.0, 10.0, 10.0));
    let b = add(&mut scene, page, NodeType::Rectangle, NodeProps::rect(20.0, 0.0, 10.0, 10.0));

    let mut sync = sync();
    sync.sync_scene(&scene);
    let handle_a = sync.handle_of(a).unwrap();

    // Move `a` and bring it to the front in one transaction.
    let applied = apply_transaction(
        &mut scene,
        vec![
            ChangeRecord::set(a, PropertyPath::X, 40.0),
            ChangeRecord::set(a, PropertyPath::Transform, Transform::translate(40.0, 0.0)),
            ChangeRecord::move_to(a, page, None),
        ],
    )
    .unwrap();
    let mut changes = ChangeSet::default();
    changes.record_transaction(&applied.transaction);
    sync.apply_changes(&scene, &changes);

    assert_eq!(sync.backend().creates(), 2);
    assert_eq!(sync.handle_of(a), Some(handle_a));
    let props = &sync.backend().props[&handle_a];
    assert_eq!(props.transform, Transform::translate(40.0, 0.0));
    assert_eq!(sync.backend().orders[&handle_a], 1);
    assert_eq!(sync.backend().orders[&sync.handle_of(b).unwrap()], 0);
}

#[test]
fn change_set_creates_and_destroys() {
    let mut scene = Scene::new();
    let page = scene.current_page();
    let a = add(&mut scene, page, NodeType::Rectangle, NodeProps::rect(0.0, 0.0, 10.0, 10.0));
    let mut sync = sync();
    sync.sync_scene(&scene);

    let fresh = scene.create_element(NodeType::Text, NodeProps::rect(0.0, 0.0, 5.0, 5.0));
    let fresh_id = fresh.id;
    let applied = apply_transaction(
        &mut scene,
        vec![ChangeRecord::add(page, fresh), ChangeRecord::delete(a)],
    )
    .unwrap();
    let mut changes = ChangeSet::default();
    changes.record_transaction(&applied.transaction);
    sync.apply_changes(&scene, &changes);

    assert_eq!(sync.handle_of(a), None);
    assert!(sync.handle_of(fresh_id).is_some());
    assert_eq!(sync.len(), 1);
}
