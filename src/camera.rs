#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sum `self + other`.
    #[must_use]
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Pan/zoom state for the whole canvas.
///
/// `pan` is in screen pixels, `zoom` is a scale factor (1.0 = no zoom).
/// Persisted as `{"zoom": z, "pan": {"x": .., "y": ..}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredViewport")]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::default() }
    }
}

/// Lenient on-disk shape: missing or zero zoom reads as 1, missing pan as origin.
#[derive(Deserialize)]
struct StoredViewport {
    zoom: Option<f64>,
    pan: Option<Point>,
}

impl From<StoredViewport> for Viewport {
    fn from(raw: StoredViewport) -> Self {
        let zoom = raw.zoom.filter(|z| z.is_finite() && *z > 0.0).unwrap_or(1.0);
        Self { zoom, pan: raw.pan.unwrap_or_default() }
    }
}

impl Viewport {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan.x) / self.zoom,
            y: (screen.y - self.pan.y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan.x,
            y: world.y * self.zoom + self.pan.y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Convert a screen-space pointer delta to a world-space delta.
    #[must_use]
    pub fn screen_delta_to_world(&self, delta: Point) -> Point {
        Point::new(delta.x / self.zoom, delta.y / self.zoom)
    }

    /// Set `zoom` (already clamped by the caller) and re-derive `pan` so the
    /// world point under `center` stays under it.
    pub fn zoom_about(&mut self, zoom: f64, center: Point) {
        let ratio = zoom / self.zoom;
        self.pan = Point {
            x: center.x - (center.x - self.pan.x) * ratio,
            y: center.y - (center.y - self.pan.y) * ratio,
        };
        self.zoom = zoom;
    }

    /// Zoom as a rounded percentage for display (`1.0` → `100`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }
}
