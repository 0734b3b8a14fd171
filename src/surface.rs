//! Output surface: the per-card style properties the host renders.
//!
//! During a gesture the engine writes positions and sizes straight to the
//! surface every tick so the card tracks the pointer without a full
//! re-render. When the gesture ends, [`resync`] rewrites any mounted element
//! whose styles drifted from the visual store. Writes only touch mismatching
//! properties, so a resync of an already-consistent surface writes nothing.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use web_sys::HtmlElement;

use crate::content::DocumentId;
use crate::storage::js_reason;
use crate::visual::{VisualState, VisualStore};

/// A style property the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleProp {
    Transform,
    Width,
    Height,
}

impl StyleProp {
    pub const ALL: [StyleProp; 3] = [Self::Transform, Self::Width, Self::Height];

    #[must_use]
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

/// Current inline style values of one mounted element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceStyle {
    pub transform: String,
    pub width: String,
    pub height: String,
}

impl SurfaceStyle {
    /// Styles that place an element at `state`.
    #[must_use]
    pub fn from_visual(state: &VisualState) -> Self {
        Self {
            transform: translate(state),
            width: px(state.width),
            height: px(state.height),
        }
    }

    #[must_use]
    pub fn get(&self, prop: StyleProp) -> &str {
        match prop {
            StyleProp::Transform => &self.transform,
            StyleProp::Width => &self.width,
            StyleProp::Height => &self.height,
        }
    }

    fn set(&mut self, prop: StyleProp, value: &str) {
        let slot = match prop {
            StyleProp::Transform => &mut self.transform,
            StyleProp::Width => &mut self.width,
            StyleProp::Height => &mut self.height,
        };
        value.clone_into(slot);
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

fn translate(state: &VisualState) -> String {
    format!("translate({}px, {}px)", state.x, state.y)
}

/// Elements the engine can style, keyed by document id.
pub trait Surface {
    /// Style of the element for `id`, or `None` when it isn't mounted.
    fn style(&self, id: &DocumentId) -> Option<SurfaceStyle>;

    /// Write one property. Returns false when the element isn't mounted.
    fn set_style(&mut self, id: &DocumentId, prop: StyleProp, value: &str) -> bool;

    /// Ids with a mounted element.
    fn mounted(&self) -> Vec<DocumentId>;

    fn is_mounted(&self, id: &DocumentId) -> bool {
        self.style(id).is_some()
    }
}

/// Write the transform for `state`. Returns false when `id` isn't mounted.
pub fn write_position(surface: &mut dyn Surface, id: &DocumentId, state: &VisualState) -> bool {
    surface.set_style(id, StyleProp::Transform, &translate(state))
}

/// Write transform and size for `state`. Returns false when `id` isn't mounted.
pub fn write_geometry(surface: &mut dyn Surface, id: &DocumentId, state: &VisualState) -> bool {
    let desired = SurfaceStyle::from_visual(state);
    StyleProp::ALL
        .into_iter()
        .all(|prop| surface.set_style(id, prop, desired.get(prop)))
}

/// Bring every mounted element in line with `visuals`, writing only the
/// properties that differ. Elements without a stored placement use
/// `fallback`. Returns the number of property writes.
pub fn resync(surface: &mut dyn Surface, visuals: &VisualStore, fallback: VisualState) -> usize {
    let mut writes = 0;
    for id in surface.mounted() {
        let Some(current) = surface.style(&id) else {
            continue;
        };
        let desired = SurfaceStyle::from_visual(&visuals.get_or(&id, fallback));
        for prop in StyleProp::ALL {
            if current.get(prop) != desired.get(prop) && surface.set_style(&id, prop, desired.get(prop)) {
                writes += 1;
            }
        }
    }
    writes
}

// =============================================================================
// MEMORY SURFACE
// =============================================================================

/// Surface backed by plain strings. Clones share state, so a test can keep a
/// handle after giving one to the engine and inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: Rc<RefCell<HashMap<DocumentId, SurfaceStyle>>>,
    writes: Rc<Cell<usize>>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount an element with empty styles.
    pub fn mount(&self, id: DocumentId) {
        self.elements.borrow_mut().insert(id, SurfaceStyle::default());
    }

    pub fn unmount(&self, id: &DocumentId) {
        self.elements.borrow_mut().remove(id);
    }

    /// Total property writes since creation.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Overwrite a property without counting it, as an outside re-render would.
    pub fn clobber(&self, id: &DocumentId, prop: StyleProp, value: &str) {
        if let Some(style) = self.elements.borrow_mut().get_mut(id) {
            style.set(prop, value);
        }
    }
}

impl Surface for MemorySurface {
    fn style(&self, id: &DocumentId) -> Option<SurfaceStyle> {
        self.elements.borrow().get(id).cloned()
    }

    fn set_style(&mut self, id: &DocumentId, prop: StyleProp, value: &str) -> bool {
        let mut elements = self.elements.borrow_mut();
        let Some(style) = elements.get_mut(id) else {
            return false;
        };
        style.set(prop, value);
        self.writes.set(self.writes.get() + 1);
        true
    }

    fn mounted(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.elements.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }
}

// =============================================================================
// DOM SURFACE
// =============================================================================

/// Surface over the host's card elements, writing inline styles.
#[derive(Debug, Clone, Default)]
pub struct DomSurface {
    elements: Rc<RefCell<HashMap<DocumentId, HtmlElement>>>,
}

impl DomSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, id: DocumentId, element: HtmlElement) {
        self.elements.borrow_mut().insert(id, element);
    }

    pub fn unmount(&self, id: &DocumentId) {
        self.elements.borrow_mut().remove(id);
    }
}

impl Surface for DomSurface {
    fn style(&self, id: &DocumentId) -> Option<SurfaceStyle> {
        let elements = self.elements.borrow();
        let style = elements.get(id)?.style();
        let read = |prop: StyleProp| match style.get_property_value(prop.css_name()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(id = %id, prop = prop.css_name(), error = %js_reason(&e), "failed to read card style");
                String::new()
            }
        };
        Some(SurfaceStyle {
            transform: read(StyleProp::Transform),
            width: read(StyleProp::Width),
            height: read(StyleProp::Height),
        })
    }

    fn set_style(&mut self, id: &DocumentId, prop: StyleProp, value: &str) -> bool {
        let elements = self.elements.borrow();
        let Some(element) = elements.get(id) else {
            return false;
        };
        if let Err(e) = element.style().set_property(prop.css_name(), value) {
            tracing::warn!(id = %id, prop = prop.css_name(), error = %js_reason(&e), "failed to write card style");
        }
        true
    }

    fn mounted(&self) -> Vec<DocumentId> {
        self.elements.borrow().keys().cloned().collect()
    }
}
