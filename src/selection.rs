//! Selection set and the rubber-band selection rectangle.
//!
//! The selection is a set of ids plus an optional primary id. A single
//! selection is the one-element case (the primary is that element); once the
//! set grows past one member there is no primary.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::BTreeSet;

use crate::camera::Point;
use crate::content::DocumentId;
use crate::visual::{VisualState, VisualStore};

/// Currently selected documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<DocumentId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with exactly `id`.
    pub fn select_only(&mut self, id: DocumentId) {
        self.ids.clear();
        self.ids.insert(id);
    }

    /// Add `id` if absent, remove it if present. Returns whether `id` is
    /// selected afterwards.
    pub fn toggle(&mut self, id: &DocumentId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Replace the whole set.
    pub fn set_all(&mut self, ids: impl IntoIterator<Item = DocumentId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn remove(&mut self, id: &DocumentId) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// More than one document selected.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.ids.len() > 1
    }

    /// The single selected id, when exactly one is selected.
    #[must_use]
    pub fn primary(&self) -> Option<&DocumentId> {
        if self.ids.len() == 1 { self.ids.iter().next() } else { None }
    }

    /// Selected ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentId> {
        self.ids.iter()
    }
}

/// Rubber-band rectangle between the press point and the current pointer,
/// both in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: Point,
    pub end: Point,
}

impl SelectionRect {
    /// Zero-area rectangle anchored at `start`.
    #[must_use]
    pub fn at(start: Point) -> Self {
        Self { start, end: start }
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.start.x.min(self.end.x)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.start.x.max(self.end.x)
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.start.y.min(self.end.y)
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.start.y.max(self.end.y)
    }

    /// Normalized `{x, y, width, height}` for drawing the band.
    #[must_use]
    pub fn bounds(&self) -> VisualState {
        VisualState::new(self.left(), self.top(), self.right() - self.left(), self.bottom() - self.top())
    }

    /// True once the pointer has moved off the press point on both axes.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.right() > self.left() && self.bottom() > self.top()
    }

    /// Strict AABB overlap: rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, rect: &VisualState) -> bool {
        rect.x < self.right() && rect.right() > self.left() && rect.y < self.bottom() && rect.bottom() > self.top()
    }

    /// Ids among `candidates` whose placement overlaps this rectangle.
    /// Documents without a stored placement use `fallback`.
    #[must_use]
    pub fn members<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a DocumentId>,
        visuals: &VisualStore,
        fallback: VisualState,
    ) -> BTreeSet<DocumentId> {
        candidates
            .into_iter()
            .filter(|id| self.overlaps(&visuals.get_or(id, fallback)))
            .cloned()
            .collect()
    }
}
