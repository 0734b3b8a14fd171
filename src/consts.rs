//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width a document card can be resized to, in world units.
pub const MIN_DOC_WIDTH: f64 = 200.0;

/// Smallest height a document card can be resized to, in world units.
pub const MIN_DOC_HEIGHT: f64 = 150.0;

/// Width given to a freshly created card and to unknown visual states.
pub const DEFAULT_DOC_WIDTH: f64 = 300.0;

/// Height given to a freshly created card and to unknown visual states.
pub const DEFAULT_DOC_HEIGHT: f64 = 200.0;

/// World-space offset from the visible top-left corner for new cards.
pub const NEW_DOC_OFFSET: f64 = 200.0;

// ── Viewport ────────────────────────────────────────────────────

/// Lower zoom bound.
pub const ZOOM_MIN: f64 = 0.1;

/// Upper zoom bound.
pub const ZOOM_MAX: f64 = 3.0;

/// Additive step used by the zoom-in / zoom-out commands.
pub const ZOOM_STEP: f64 = 0.1;

/// Multiplicative factor for one ctrl+wheel notch towards the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Multiplicative factor for one ctrl+wheel notch away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space radius of a corner resize handle, in pixels.
pub const HANDLE_RADIUS_PX: f64 = 6.0;

// ── Storage ─────────────────────────────────────────────────────

/// Storage key for the per-document visual state map.
pub const VISUAL_STATES_KEY: &str = "document-visual-states";

/// Storage key for the per-document content map.
pub const CONTENT_STATES_KEY: &str = "document-content-states";

/// Storage key for the canvas viewport record.
pub const VIEWPORT_STATE_KEY: &str = "canvas-view-state";

// ── Content ─────────────────────────────────────────────────────

/// Title given to documents created without one.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Paragraphs shown in a card preview.
pub const PREVIEW_PARAGRAPHS: usize = 3;

/// Character cap for a card preview before it is cut with an ellipsis.
pub const PREVIEW_MAX_CHARS: usize = 300;

/// Character cap for the one-line sidebar preview.
pub const FIRST_LINE_MAX_CHARS: usize = 50;
