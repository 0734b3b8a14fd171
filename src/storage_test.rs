use super::*;
use crate::camera::Point;
use crate::consts::{CONTENT_STATES_KEY, VIEWPORT_STATE_KEY, VISUAL_STATES_KEY};
use time::macros::datetime;

fn doc(id: &str, title: &str) -> Document {
    Document {
        id: DocumentId::from(id),
        title: title.to_owned(),
        content: String::new(),
        created_at: datetime!(2025-01-01 00:00 UTC),
        updated_at: datetime!(2025-01-01 00:00 UTC),
    }
}

// =============================================================
// MemoryStorage
// =============================================================

#[test]
fn memory_storage_roundtrip_and_remove() {
    let mut storage = MemoryStorage::new();
    assert_eq!(storage.get_item("k").unwrap(), None);
    storage.set_item("k", "v").unwrap();
    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
    storage.remove_item("k").unwrap();
    assert!(storage.is_empty());
    storage.remove_item("missing").unwrap();
}

#[test]
fn memory_storage_clones_share_items() {
    let handle = MemoryStorage::new();
    let mut other = handle.clone();
    other.set_item("k", "v").unwrap();
    assert_eq!(handle.raw("k").as_deref(), Some("v"));
    assert_eq!(handle.len(), 1);
}

#[test]
fn failing_writes_report_write_error() {
    let mut storage = MemoryStorage::new();
    storage.set_fail_writes(true);
    let err = storage.set_item("k", "v").unwrap_err();
    assert_eq!(err.error_code(), "E_STORAGE_WRITE");
    assert!(storage.raw("k").is_none());
}

// =============================================================
// read_json / write_json
// =============================================================

#[test]
fn read_json_missing_and_empty_are_none() {
    let storage = MemoryStorage::new();
    assert!(read_json::<Viewport>(&storage, "vp").unwrap().is_none());
    storage.put_raw("vp", "");
    assert!(read_json::<Viewport>(&storage, "vp").unwrap().is_none());
}

#[test]
fn read_json_invalid_is_corrupt() {
    let storage = MemoryStorage::new();
    storage.put_raw("vp", "{not json");
    let err = read_json::<Viewport>(&storage, "vp").unwrap_err();
    assert_eq!(err.error_code(), "E_STORAGE_CORRUPT");
    assert!(err.to_string().contains("vp"));
}

#[test]
fn write_json_then_read_json() {
    let mut storage = MemoryStorage::new();
    let vp = Viewport { zoom: 2.0, pan: Point::new(10.0, -5.0) };
    write_json(&mut storage, "vp", &vp).unwrap();
    assert_eq!(read_json::<Viewport>(&storage, "vp").unwrap(), Some(vp));
}

#[test]
fn save_namespace_reports_failure_without_error() {
    let mut storage = MemoryStorage::new();
    assert!(save_namespace(&mut storage, "vp", &Viewport::default()));
    storage.set_fail_writes(true);
    assert!(!save_namespace(&mut storage, "vp", &Viewport { zoom: 2.0, pan: Point::default() }));
    let kept = storage.raw("vp").unwrap();
    assert!(kept.contains("\"zoom\":1"));
}

// =============================================================
// Viewport namespace
// =============================================================

#[test]
fn load_viewport_defaults_when_missing_or_corrupt() {
    let storage = MemoryStorage::new();
    assert_eq!(load_viewport(&storage, VIEWPORT_STATE_KEY), Viewport::default());
    storage.put_raw(VIEWPORT_STATE_KEY, "[1,2");
    assert_eq!(load_viewport(&storage, VIEWPORT_STATE_KEY), Viewport::default());
}

#[test]
fn load_viewport_is_lenient_about_fields() {
    let storage = MemoryStorage::new();
    storage.put_raw(VIEWPORT_STATE_KEY, r#"{"zoom":0}"#);
    assert_eq!(load_viewport(&storage, VIEWPORT_STATE_KEY), Viewport::default());

    storage.put_raw(VIEWPORT_STATE_KEY, r#"{"pan":{"x":30,"y":40}}"#);
    let vp = load_viewport(&storage, VIEWPORT_STATE_KEY);
    assert!((vp.zoom - 1.0).abs() < f64::EPSILON);
    assert_eq!(vp.pan, Point::new(30.0, 40.0));
}

// =============================================================
// Map namespaces
// =============================================================

#[test]
fn load_visuals_reads_each_entry() {
    let storage = MemoryStorage::new();
    storage.put_raw(
        VISUAL_STATES_KEY,
        r#"{"a":{"x":1,"y":2,"width":300,"height":200},"b":{"x":5,"y":6,"width":250,"height":180}}"#,
    );
    let visuals = load_visuals(&storage, VISUAL_STATES_KEY);
    assert_eq!(visuals.len(), 2);
    assert_eq!(visuals.get(&DocumentId::from("b")), Some(VisualState::new(5.0, 6.0, 250.0, 180.0)));
}

#[test]
fn load_visuals_skips_malformed_entries() {
    let storage = MemoryStorage::new();
    storage.put_raw(VISUAL_STATES_KEY, r#"{"a":{"x":1,"y":2,"width":300,"height":200},"b":{"x":"left"}}"#);
    let visuals = load_visuals(&storage, VISUAL_STATES_KEY);
    assert_eq!(visuals.len(), 1);
    assert!(visuals.get(&DocumentId::from("b")).is_none());
}

#[test]
fn load_visuals_non_object_is_empty() {
    let storage = MemoryStorage::new();
    storage.put_raw(VISUAL_STATES_KEY, "[1,2,3]");
    assert!(load_visuals(&storage, VISUAL_STATES_KEY).is_empty());
}

#[test]
fn contents_roundtrip_through_storage() {
    let mut storage = MemoryStorage::new();
    let store: ContentStore = [doc("a", "Alpha"), doc("b", "Beta")].into_iter().collect();
    assert!(save_namespace(&mut storage, CONTENT_STATES_KEY, &store));
    let raw = storage.raw(CONTENT_STATES_KEY).unwrap();
    assert!(raw.contains("\"createdAt\":\"2025-01-01T00:00:00Z\""));
    assert_eq!(load_contents(&storage, CONTENT_STATES_KEY), store);
}

#[test]
fn load_contents_uses_map_key_as_id() {
    let storage = MemoryStorage::new();
    storage.put_raw(
        CONTENT_STATES_KEY,
        r#"{"doc-1":{"id":"stale","title":"T","content":"","createdAt":"2024-05-01T10:00:00.000Z","updatedAt":"2024-05-01T10:00:00.000Z"}}"#,
    );
    let contents = load_contents(&storage, CONTENT_STATES_KEY);
    let loaded = contents.get(&DocumentId::from("doc-1")).unwrap();
    assert_eq!(loaded.id.as_str(), "doc-1");
    assert_eq!(loaded.title, "T");
}

#[test]
fn load_contents_skips_entries_with_bad_dates() {
    let storage = MemoryStorage::new();
    storage.put_raw(
        CONTENT_STATES_KEY,
        r#"{"x":{"id":"x","title":"T","content":"","createdAt":"yesterday","updatedAt":"2024-05-01T10:00:00Z"}}"#,
    );
    assert!(load_contents(&storage, CONTENT_STATES_KEY).is_empty());
}
