//! Visual state store: per-document placement on the canvas.
//!
//! Holds `{x, y, width, height}` in world coordinates, keyed by document id.
//! Pure data: the store never clamps or validates geometry, that belongs to
//! the gestures that produce it. Persisted as one flat JSON object under the
//! visual-states storage key.

#[cfg(test)]
#[path = "visual_test.rs"]
mod visual_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{DEFAULT_DOC_HEIGHT, DEFAULT_DOC_WIDTH};
use crate::content::DocumentId;

/// Position and size of one document card in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for VisualState {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: DEFAULT_DOC_WIDTH, height: DEFAULT_DOC_HEIGHT }
    }
}

impl VisualState {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `pt` lies inside the rect, edges included.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }
}

/// Sparse update for a visual state. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl VisualPatch {
    /// Patch that moves the top-left corner to `pt`.
    #[must_use]
    pub fn position(pt: Point) -> Self {
        Self { x: Some(pt.x), y: Some(pt.y), ..Self::default() }
    }

    /// Patch that replaces the whole geometry.
    #[must_use]
    pub fn geometry(state: VisualState) -> Self {
        Self { x: Some(state.x), y: Some(state.y), width: Some(state.width), height: Some(state.height) }
    }
}

/// In-memory map of document placements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualStore {
    states: HashMap<DocumentId, VisualState>,
}

impl VisualStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Placement for `id`, if one was ever stored.
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<VisualState> {
        self.states.get(id).copied()
    }

    /// Placement for `id`, or `fallback` when none is stored.
    #[must_use]
    pub fn get_or(&self, id: &DocumentId, fallback: VisualState) -> VisualState {
        self.get(id).unwrap_or(fallback)
    }

    /// Insert or replace the placement for `id`.
    pub fn set(&mut self, id: DocumentId, state: VisualState) {
        self.states.insert(id, state);
    }

    /// Merge `patch` into the placement for `id`. Unknown ids start from
    /// `fallback`. Returns the resulting placement.
    pub fn update(&mut self, id: &DocumentId, patch: VisualPatch, fallback: VisualState) -> VisualState {
        let state = self.states.entry(id.clone()).or_insert(fallback);
        if let Some(x) = patch.x {
            state.x = x;
        }
        if let Some(y) = patch.y {
            state.y = y;
        }
        if let Some(w) = patch.width {
            state.width = w;
        }
        if let Some(h) = patch.height {
            state.height = h;
        }
        *state
    }

    /// Remove the placement for `id`, returning it if present.
    pub fn remove(&mut self, id: &DocumentId) -> Option<VisualState> {
        self.states.remove(id)
    }

    /// Drop every placement.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate `(id, placement)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, &VisualState)> {
        self.states.iter()
    }
}

impl FromIterator<(DocumentId, VisualState)> for VisualStore {
    fn from_iter<I: IntoIterator<Item = (DocumentId, VisualState)>>(iter: I) -> Self {
        Self { states: iter.into_iter().collect() }
    }
}
