//! Hit testing: point → node lookup on the current page.
//!
//! Walks the page in reverse paint order (last painted = topmost). Hidden
//! and locked nodes, and everything inside them, are never hit.

use kurbo::{Point, Rect};
use zg_core::{NodeId, Scene, SceneNode};

/// Page-space bounding box of a node's transformed rectangle.
pub fn world_bounds(node: &SceneNode) -> Rect {
    let g = &node.geometry;
    let local = Rect::new(0.0, 0.0, f64::from(g.width), f64::from(g.height));
    g.transform.to_affine().transform_rect_bbox(local)
}

fn contains_point(node: &SceneNode, p: Point) -> bool {
    let g = &node.geometry;
    let affine = g.transform.to_affine();
    if affine.determinant() == 0.0 {
        return false;
    }
    let local = affine.inverse() * p;
    Rect::new(0.0, 0.0, f64::from(g.width), f64::from(g.height)).contains(local)
}

/// Whether the node and all of its ancestors are visible and unlocked.
pub fn is_interactive(scene: &Scene, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(cur) = current {
        match scene.get_node_by_id(cur) {
            Some(node) if !node.visible || node.locked => return false,
            Some(_) => current = scene.parent_of(cur),
            None => return false,
        }
    }
    true
}

/// Find the topmost node at page position (px, py).
/// Returns `None` if no node is hit (background).
pub fn hit_test(scene: &Scene, px: f32, py: f32) -> Option<NodeId> {
    let p = Point::new(f64::from(px), f64::from(py));
    scene.get_nodes().into_iter().rev().find(|id| {
        scene
            .get_node_by_id(*id)
            .is_some_and(|node| contains_point(node, p))
            && is_interactive(scene, *id)
    })
}

/// All interactive nodes whose bounds intersect `area`, in paint order.
/// Used for marquee selection.
pub fn hit_test_rect(scene: &Scene, area: Rect) -> Vec<NodeId> {
    let area = area.abs();
    scene
        .get_nodes()
        .into_iter()
        .filter(|id| {
            scene.get_node_by_id(*id).is_some_and(|node| {
                let b = world_bounds(node);
                b.intersect(area).area() > 0.0 || (area.area() == 0.0 && b.contains(area.origin()))
            }) && is_interactive(scene, *id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zg_core::{ChangeRecord, NodeProps, NodeType, PropertyPath, Transform, apply_transaction};

    fn scene_with(rects: &[(f32, f32, f32, f32)]) -> (Scene, Vec<NodeId>) {
        let mut scene = Scene::new();
        let page = scene.current_page();
        let mut ids = Vec::new();
        let mut records = Vec::new();
        for &(x, y, w, h) in rects {
            let node = scene.create_element(NodeType::Rectangle, NodeProps::rect(x, y, w, h));
            ids.push(node.id);
            records.push(ChangeRecord::add(page, node));
        }
        apply_transaction(&mut scene, records).unwrap();
        (scene, ids)
    }

    #[test]
    fn topmost_wins() {
        let (scene, ids) = scene_with(&[(0.0, 0.0, 100.0, 100.0), (50.0, 50.0, 100.0, 100.0)]);
        assert_eq!(hit_test(&scene, 75.0, 75.0), Some(ids[1]));
        assert_eq!(hit_test(&scene, 10.0, 10.0), Some(ids[0]));
        assert_eq!(hit_test(&scene, 500.0, 500.0), None);
    }

    #[test]
    fn rotated_node_uses_inverse_transform() {
        let (mut scene, ids) = scene_with(&[(100.0, 100.0, 100.0, 10.0)]);
        apply_transaction(
            &mut scene,
            vec![ChangeRecord::set(
                ids[0],
                PropertyPath::Transform,
                Transform::from_position_rotation(100.0, 100.0, 90.0),
            )],
        )
        .unwrap();
        // Rotated 90°, the bar now extends downward from (100, 100).
        assert_eq!(hit_test(&scene, 95.0, 150.0), Some(ids[0]));
        assert_eq!(hit_test(&scene, 150.0, 105.0), None);
    }

    #[test]
    fn hidden_and_locked_are_skipped() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 100.0, 100.0), (0.0, 0.0, 100.0, 100.0)]);
        apply_transaction(&mut scene, vec![ChangeRecord::set(ids[1], PropertyPath::Locked, true)]).unwrap();
        assert_eq!(hit_test(&scene, 10.0, 10.0), Some(ids[0]));
        apply_transaction(&mut scene, vec![ChangeRecord::set(ids[0], PropertyPath::Visible, false)]).unwrap();
        assert_eq!(hit_test(&scene, 10.0, 10.0), None);
    }

    #[test]
    fn marquee_collects_intersecting() {
        let (scene, ids) = scene_with(&[
            (0.0, 0.0, 10.0, 10.0),
            (20.0, 20.0, 10.0, 10.0),
            (200.0, 200.0, 10.0, 10.0),
        ]);
        // Dragged up-left; `abs` normalizes it.
        let hits = hit_test_rect(&scene, Rect::new(25.0, 25.0, 5.0, 5.0));
        assert_eq!(hits, vec![ids[0], ids[1]]);
    }
}
