//! Input model: modifier keys, mouse buttons, cursors, and the gesture state machine.
//!
//! `Modifiers` and `Button` capture the user's intent at the time of a
//! pointer event. `InputState` is the active gesture tracked between
//! pointer-down and pointer-up; each active variant carries the pre-gesture
//! snapshot needed both to compute deltas and to restore on abort.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::content::DocumentId;
use crate::hit::ResizeHandle;
use crate::selection::{Selection, SelectionRect};
use crate::visual::VisualState;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Cmd: click toggles membership instead of replacing the selection.
    #[must_use]
    pub fn multi_select(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key, holding the DOM `KeyboardEvent.code`/`key` name
/// (e.g. `"Space"`, `"Escape"`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == "Space" || self.0 == " "
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = away from the user).
    pub dy: f64,
}

/// Pointer cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    /// Space is held; a background press will pan.
    Grab,
    /// A pan is in progress.
    Grabbing,
    /// A resize is in progress.
    Resize(ResizeHandle),
}

impl Cursor {
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Resize(handle) => handle.css_cursor(),
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Selected documents.
    pub selection: Selection,
    /// Space is held down and pans on the next background press.
    pub space_held: bool,
    /// Document whose title is being edited inline, if any.
    pub editing_title: Option<DocumentId>,
    /// A host text field outside the canvas (the full editor, a search box)
    /// has focus. Keys typed there must not pan or delete cards.
    pub text_input_focused: bool,
}

impl UiState {
    /// Some text field owns the keyboard.
    #[must_use]
    pub fn typing(&self) -> bool {
        self.text_input_focused || self.editing_title.is_some()
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the background with Space held.
    Panning {
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        /// Viewport pan at pointer-down.
        initial_pan: Point,
    },
    /// Moving a single card.
    Dragging {
        id: DocumentId,
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        /// Card top-left at pointer-down.
        initial: Point,
    },
    /// Moving every selected card by the same delta.
    MultiDragging {
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        /// Top-left of each moving card at pointer-down.
        initial_positions: Vec<(DocumentId, Point)>,
        /// Card pressed to start the gesture; `None` when it started on the background.
        pressed: Option<DocumentId>,
        /// The press toggled the selection with ctrl/cmd.
        toggled: bool,
        /// Pointer has moved since pointer-down.
        moved: bool,
    },
    /// Dragging a corner handle.
    Resizing {
        id: DocumentId,
        handle: ResizeHandle,
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        /// Card geometry at pointer-down.
        initial: VisualState,
    },
    /// Drawing a rubber-band selection.
    Selecting {
        rect: SelectionRect,
        /// Selection before the band started, restored on abort.
        prior: Selection,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::Dragging { .. } => "dragging",
            Self::MultiDragging { .. } => "multi_dragging",
            Self::Resizing { .. } => "resizing",
            Self::Selecting { .. } => "selecting",
        }
    }
}
