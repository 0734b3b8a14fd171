#![allow(clippy::float_cmp)]

use super::*;

fn id(s: &str) -> DocumentId {
    DocumentId::from(s)
}

#[test]
fn default_state_is_300_by_200_at_origin() {
    let s = VisualState::default();
    assert_eq!(s, VisualState::new(0.0, 0.0, 300.0, 200.0));
}

#[test]
fn edges() {
    let s = VisualState::new(10.0, 20.0, 300.0, 150.0);
    assert_eq!(s.right(), 310.0);
    assert_eq!(s.bottom(), 170.0);
    assert_eq!(s.origin(), Point::new(10.0, 20.0));
}

#[test]
fn contains_is_edge_inclusive() {
    let s = VisualState::new(0.0, 0.0, 100.0, 100.0);
    assert!(s.contains(Point::new(0.0, 0.0)));
    assert!(s.contains(Point::new(100.0, 100.0)));
    assert!(s.contains(Point::new(50.0, 50.0)));
    assert!(!s.contains(Point::new(100.1, 50.0)));
    assert!(!s.contains(Point::new(50.0, -0.1)));
}

#[test]
fn get_missing_is_none() {
    let store = VisualStore::new();
    assert!(store.get(&id("a")).is_none());
}

#[test]
fn get_or_falls_back() {
    let store = VisualStore::new();
    let fallback = VisualState::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(store.get_or(&id("a"), fallback), fallback);
}

#[test]
fn update_unknown_starts_from_fallback() {
    let mut store = VisualStore::new();
    let fallback = VisualState::new(0.0, 0.0, 500.0, 400.0);
    let out = store.update(&id("a"), VisualPatch { x: Some(50.0), ..VisualPatch::default() }, fallback);
    assert_eq!(out, VisualState::new(50.0, 0.0, 500.0, 400.0));
    assert_eq!(store.get(&id("a")), Some(out));
}

#[test]
fn update_merges_only_present_fields() {
    let mut store = VisualStore::new();
    store.set(id("a"), VisualState::new(10.0, 20.0, 250.0, 180.0));
    store.update(&id("a"), VisualPatch { height: Some(300.0), ..VisualPatch::default() }, VisualState::default());
    assert_eq!(store.get(&id("a")), Some(VisualState::new(10.0, 20.0, 250.0, 300.0)));
}

#[test]
fn position_patch_keeps_size() {
    let mut store = VisualStore::new();
    store.set(id("a"), VisualState::new(0.0, 0.0, 400.0, 250.0));
    store.update(&id("a"), VisualPatch::position(Point::new(-5.0, 7.5)), VisualState::default());
    assert_eq!(store.get(&id("a")), Some(VisualState::new(-5.0, 7.5, 400.0, 250.0)));
}

#[test]
fn geometry_patch_replaces_everything() {
    let mut store = VisualStore::new();
    store.set(id("a"), VisualState::new(0.0, 0.0, 400.0, 250.0));
    let next = VisualState::new(1.0, 2.0, 210.0, 160.0);
    store.update(&id("a"), VisualPatch::geometry(next), VisualState::default());
    assert_eq!(store.get(&id("a")), Some(next));
}

#[test]
fn remove_and_clear() {
    let mut store = VisualStore::new();
    store.set(id("a"), VisualState::default());
    store.set(id("b"), VisualState::default());
    assert_eq!(store.len(), 2);
    assert!(store.remove(&id("a")).is_some());
    assert!(store.remove(&id("a")).is_none());
    store.clear();
    assert!(store.is_empty());
}

#[test]
fn serializes_as_flat_object_keyed_by_id() {
    let mut store = VisualStore::new();
    store.set(id("1700000000000"), VisualState::new(100.0, 100.0, 300.0, 200.0));
    let json = serde_json::to_value(&store).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "1700000000000": { "x": 100.0, "y": 100.0, "width": 300.0, "height": 200.0 }
        })
    );
}

#[test]
fn deserializes_flat_id_map() {
    let raw = r#"{"a":{"x":1,"y":2,"width":300,"height":200},"b":{"x":-4.5,"y":0,"width":280,"height":180}}"#;
    let store: VisualStore = serde_json::from_str(raw).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&id("b")), Some(VisualState::new(-4.5, 0.0, 280.0, 180.0)));
}
