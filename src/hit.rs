#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Viewport};
use crate::content::DocumentId;
use crate::selection::Selection;
use crate::visual::{VisualState, VisualStore};

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas.
    Background,
    /// The body of a document card.
    Body(DocumentId),
    /// A corner resize handle of a selected card.
    Handle(DocumentId, ResizeHandle),
    /// An interactive sub-control of a card (title editor, action buttons).
    /// Never starts a gesture.
    Control(DocumentId),
}

/// Corner resize handles, rendered only on selected cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// Handle moves the left edge (so `x` shifts as width changes).
    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    /// Handle moves the top edge (so `y` shifts as height changes).
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }

    /// World position of this handle on `rect`.
    #[must_use]
    pub fn corner(self, rect: &VisualState) -> Point {
        let x = if self.moves_west() { rect.x } else { rect.right() };
        let y = if self.moves_north() { rect.y } else { rect.bottom() };
        Point::new(x, y)
    }

    /// CSS cursor shown while this handle is dragged.
    #[must_use]
    pub fn css_cursor(self) -> &'static str {
        match self {
            Self::Nw => "nw-resize",
            Self::Ne => "ne-resize",
            Self::Sw => "sw-resize",
            Self::Se => "se-resize",
        }
    }

    /// Parse a DOM handle name (`"nw"`, `"ne"`, `"sw"`, `"se"`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "nw" => Some(Self::Nw),
            "ne" => Some(Self::Ne),
            "sw" => Some(Self::Sw),
            "se" => Some(Self::Se),
            _ => None,
        }
    }
}

/// Find what is under `world_pt`.
///
/// `order` is render order, so later ids sit on top. Cards without a stored
/// placement occupy `fallback`. Handles of selected
/// cards win over any body; among bodies the topmost wins. Handle hit boxes
/// are squares of `handle_radius_px` screen pixels around each corner,
/// converted to world units through `viewport`.
#[must_use]
pub fn hit_test(
    world_pt: Point,
    order: &[DocumentId],
    visuals: &VisualStore,
    fallback: VisualState,
    viewport: &Viewport,
    selection: &Selection,
    handle_radius_px: f64,
) -> HitTarget {
    let radius = viewport.screen_dist_to_world(handle_radius_px);

    for id in order.iter().rev().filter(|id| selection.contains(id)) {
        let rect = visuals.get_or(id, fallback);
        for handle in ResizeHandle::ALL {
            let corner = handle.corner(&rect);
            if (world_pt.x - corner.x).abs() <= radius && (world_pt.y - corner.y).abs() <= radius {
                return HitTarget::Handle(id.clone(), handle);
            }
        }
    }

    order
        .iter()
        .rev()
        .find(|id| visuals.get_or(id, fallback).contains(world_pt))
        .map_or(HitTarget::Background, |id| HitTarget::Body(id.clone()))
}
