//! Integration tests: applying a transaction then its inverse restores the
//! scene exactly.

use pretty_assertions::assert_eq;
use zg_core::*;

fn load_fixture() -> Scene {
    let desc: NodeDescriptor =
        serde_json::from_str(include_str!("fixtures/landing_page.json")).unwrap();
    Scene::from_descriptor(&desc).unwrap()
}

fn id(name: &str) -> NodeId {
    NodeId::intern(name)
}

/// Apply `records`, undo them, and check the document is unchanged.
fn assert_inverse_restores(scene: &mut Scene, records: Vec<ChangeRecord>) -> Transaction {
    let before = scene.to_descriptor();
    let applied = apply_transaction(scene, records).expect("transaction applies");
    assert_ne!(scene.to_descriptor(), before, "transaction changed nothing");

    replay(scene, &applied.transaction.inverse()).expect("inverse applies");
    assert_eq!(scene.to_descriptor(), before);
    applied.transaction
}

#[test]
fn mixed_transaction_round_trips() {
    let mut scene = load_fixture();
    let page = scene.current_page();
    let badge = scene.create_element(
        NodeType::Rectangle,
        NodeProps::rect(20.0, 20.0, 40.0, 16.0).with_fill(Paint::solid(Rgba8::BLACK)),
    );
    let badge_id = badge.id;

    assert_inverse_restores(
        &mut scene,
        vec![
            ChangeRecord::add(id("landing_hero"), badge),
            ChangeRecord::set(badge_id, PropertyPath::CornerRadius, 4.0),
            ChangeRecord::set(id("landing_cta"), PropertyPath::Width, 220.0),
            ChangeRecord::move_to(id("landing_title"), page, Some(0)),
            ChangeRecord::delete(id("landing_shot")),
            ChangeRecord::set(page, PropertyPath::Background, Rgba8::WHITE),
        ],
    );
}

#[test]
fn deleting_subtree_records_every_descendant() {
    let mut scene = load_fixture();
    let hero_ids = scene.subtree_ids(id("landing_hero"));
    assert_eq!(hero_ids.len(), 4);

    let transaction = assert_inverse_restores(&mut scene, vec![ChangeRecord::delete(id("landing_hero"))]);
    let AppliedChange::Deleted { subtree, .. } = &transaction.changes[0] else {
        panic!("expected a delete, got {:?}", transaction.changes[0]);
    };
    assert_eq!(subtree.ids(), hero_ids);
}

#[test]
fn redo_after_undo_matches_first_application() {
    let mut scene = load_fixture();
    let applied = apply_transaction(
        &mut scene,
        vec![
            ChangeRecord::set(id("landing_footer"), PropertyPath::Height, 200.0),
            ChangeRecord::delete(id("landing_cta")),
        ],
    )
    .unwrap();
    let after = scene.to_descriptor();

    replay(&mut scene, &applied.transaction.inverse()).unwrap();
    replay(&mut scene, &applied.transaction).unwrap();
    assert_eq!(scene.to_descriptor(), after);
}

#[test]
fn deleting_current_page_falls_back_and_undo_restores_it() {
    let mut scene = load_fixture();
    let applied = apply_transaction(&mut scene, vec![ChangeRecord::delete(id("landing_home"))]).unwrap();
    assert_eq!(scene.current_page(), id("landing_drafts"));
    assert!(scene.get_node_by_id(id("landing_title")).is_none());

    replay(&mut scene, &applied.transaction.inverse()).unwrap();
    assert_eq!(scene.pages(), vec![id("landing_home"), id("landing_drafts")]);
    assert_eq!(scene.get_node_by_id(id("landing_title")).unwrap().geometry.width, 640.0);
}
