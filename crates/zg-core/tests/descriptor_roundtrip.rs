//! Integration tests: description → Scene → description.

use pretty_assertions::assert_eq;
use zg_core::*;

fn load(json: &str) -> Scene {
    let desc: NodeDescriptor = serde_json::from_str(json).expect("fixture is valid JSON");
    Scene::from_descriptor(&desc).expect("fixture is a valid scene")
}

fn id(name: &str) -> NodeId {
    NodeId::intern(name)
}

#[test]
fn fixture_loads_pages_in_order() {
    let scene = load(include_str!("fixtures/landing_page.json"));
    assert_eq!(scene.pages(), vec![id("landing_home"), id("landing_drafts")]);
    assert_eq!(scene.current_page(), id("landing_home"));
    assert_eq!(
        scene.get_nodes(),
        vec![
            id("landing_hero"),
            id("landing_title"),
            id("landing_cta"),
            id("landing_shot"),
            id("landing_footer"),
        ]
    );
}

#[test]
fn fixture_preserves_attributes() {
    let scene = load(include_str!("fixtures/landing_page.json"));

    let cta = scene.get_node_by_id(id("landing_cta")).unwrap();
    assert_eq!(cta.kind, NodeKind::Rectangle { corner_radius: 8.0 });
    assert_eq!(cta.stroke.stroke_weight, 2.0);
    assert_eq!(
        cta.fill_paints[0],
        Paint::Solid {
            color: Rgba8::WHITE,
            opacity: 0.9
        }
    );
    assert_eq!(scene.parent_of(id("landing_cta")), Some(id("landing_hero")));

    let shot = scene.get_node_by_id(id("landing_shot")).unwrap();
    assert_eq!(shot.fill_paints[0], Paint::image("screenshots/app.png"));
    assert_eq!(shot.geometry.transform, Transform::translate(760.0, 80.0));

    let footer = scene.get_node_by_id(id("landing_footer")).unwrap();
    assert!(footer.locked);

    let home = scene.get_node_by_id(id("landing_home")).unwrap();
    assert_eq!(home.name, "Home");
    assert_eq!(
        home.kind,
        NodeKind::Page {
            background: Rgba8::new(250, 250, 250, 255)
        }
    );
}

#[test]
fn export_then_import_is_lossless() {
    let scene = load(include_str!("fixtures/landing_page.json"));
    let exported = scene.to_descriptor();
    let json = serde_json::to_string_pretty(&exported).unwrap();

    let reloaded = load(&json);
    assert_eq!(reloaded.to_descriptor(), exported);
    assert_eq!(reloaded.len(), scene.len());
}

#[test]
fn duplicate_ids_in_description_are_rejected() {
    let json = r#"{"id":"dup_doc","type":"Document","children":[
        {"id":"dup_page","type":"Page","children":[
            {"id":"dup_a","type":"Rectangle"},
            {"id":"dup_a","type":"Text"}
        ]}
    ]}"#;
    let desc: NodeDescriptor = serde_json::from_str(json).unwrap();
    assert_eq!(
        Scene::from_descriptor(&desc).unwrap_err(),
        SceneError::DuplicateId(id("dup_a"))
    );
}

#[test]
fn generated_ids_avoid_imported_names() {
    let mut scene = load(include_str!("fixtures/landing_page.json"));
    let before = scene.get_nodes();
    for _ in 0..32 {
        let fresh = scene.generate_id(NodeType::Rectangle);
        assert!(!before.contains(&fresh));
    }
}
