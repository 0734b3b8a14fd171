#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn view(zoom: f64, pan_x: f64, pan_y: f64) -> Viewport {
    Viewport { zoom, pan: Point::new(pan_x, pan_y) }
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_add_sub() {
    let a = Point::new(5.0, 7.0);
    let b = Point::new(2.0, 3.0);
    assert_eq!(a.sub(b), Point::new(3.0, 4.0));
    assert_eq!(a.add(b), Point::new(7.0, 10.0));
}

// --- Viewport defaults ---

#[test]
fn viewport_default_is_identity() {
    let v = Viewport::default();
    assert_eq!(v.zoom, 1.0);
    assert_eq!(v.pan, Point::new(0.0, 0.0));
}

// --- screen_to_world ---

#[test]
fn screen_to_world_identity() {
    let v = Viewport::default();
    let world = v.screen_to_world(Point::new(50.0, 75.0));
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_with_zoom() {
    let v = view(4.0, 0.0, 0.0);
    let world = v.screen_to_world(Point::new(40.0, 80.0));
    assert!(approx_eq(world.x, 10.0));
    assert!(approx_eq(world.y, 20.0));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let v = view(2.0, 100.0, 50.0);
    let world = v.screen_to_world(Point::new(300.0, 250.0));
    assert!(point_approx_eq(world, Point::new(100.0, 100.0)));
}

// --- world_to_screen ---

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let v = view(0.5, -20.0, 10.0);
    let screen = v.world_to_screen(Point::new(100.0, 40.0));
    assert!(point_approx_eq(screen, Point::new(30.0, 30.0)));
}

#[test]
fn round_trip_world_screen_world() {
    let v = view(1.7, 33.0, -81.0);
    let world = Point::new(-12.5, 407.25);
    let back = v.screen_to_world(v.world_to_screen(world));
    assert!(point_approx_eq(back, world));
}

// --- distances ---

#[test]
fn screen_dist_to_world_divides_by_zoom() {
    let v = view(2.5, 10.0, 10.0);
    assert!(approx_eq(v.screen_dist_to_world(25.0), 10.0));
}

#[test]
fn screen_delta_to_world_ignores_pan() {
    let v = view(0.5, 400.0, -300.0);
    let d = v.screen_delta_to_world(Point::new(10.0, -4.0));
    assert!(point_approx_eq(d, Point::new(20.0, -8.0)));
}

// --- zoom_about ---

#[test]
fn zoom_about_preserves_center_world_point() {
    let center = Point::new(400.0, 300.0);
    for &(z0, z1, px, py) in &[
        (1.0, 2.0, 0.0, 0.0),
        (1.0, 0.1, 120.0, -45.0),
        (0.3, 3.0, -900.0, 250.0),
        (2.2, 1.1, 17.5, 3.25),
        (3.0, 0.1, 0.0, 0.0),
    ] {
        let mut v = view(z0, px, py);
        let before = v.screen_to_world(center);
        v.zoom_about(z1, center);
        let after = v.screen_to_world(center);
        assert!(point_approx_eq(before, after), "z0={z0} z1={z1}: {before:?} != {after:?}");
        assert_eq!(v.zoom, z1);
    }
}

#[test]
fn zoom_about_same_zoom_keeps_pan() {
    let mut v = view(1.5, 10.0, 20.0);
    v.zoom_about(1.5, Point::new(200.0, 100.0));
    assert!(point_approx_eq(v.pan, Point::new(10.0, 20.0)));
}

#[test]
fn zoom_about_formula() {
    let mut v = view(1.0, 0.0, 0.0);
    v.zoom_about(2.0, Point::new(100.0, 50.0));
    // pan' = center - (center - pan) * ratio
    assert!(point_approx_eq(v.pan, Point::new(-100.0, -50.0)));
}

// --- zoom_percent ---

#[test]
fn zoom_percent_rounds() {
    assert_eq!(view(1.0, 0.0, 0.0).zoom_percent(), 100);
    assert_eq!(view(0.1, 0.0, 0.0).zoom_percent(), 10);
    assert_eq!(view(1.234, 0.0, 0.0).zoom_percent(), 123);
    assert_eq!(view(1.0 + 0.1 + 0.1, 0.0, 0.0).zoom_percent(), 120);
}

// --- serde ---

#[test]
fn viewport_serializes_nested_pan() {
    let v = view(1.5, 10.0, -5.0);
    let json = serde_json::to_value(v).unwrap();
    assert_eq!(json, serde_json::json!({ "zoom": 1.5, "pan": { "x": 10.0, "y": -5.0 } }));
}

#[test]
fn viewport_deserialize_round_trip() {
    let v = view(0.75, 3.0, 4.0);
    let raw = serde_json::to_string(&v).unwrap();
    let back: Viewport = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, v);
}

#[test]
fn viewport_missing_fields_fall_back() {
    let v: Viewport = serde_json::from_str("{}").unwrap();
    assert_eq!(v, Viewport::default());
}

#[test]
fn viewport_zero_zoom_reads_as_one() {
    let v: Viewport = serde_json::from_str(r#"{"zoom": 0, "pan": {"x": 5, "y": 6}}"#).unwrap();
    assert_eq!(v.zoom, 1.0);
    assert_eq!(v.pan, Point::new(5.0, 6.0));
}

#[test]
fn viewport_null_pan_reads_as_origin() {
    let v: Viewport = serde_json::from_str(r#"{"zoom": 2, "pan": null}"#).unwrap();
    assert_eq!(v.zoom, 2.0);
    assert_eq!(v.pan, Point::default());
}
