use crate::camera::{Point, Viewport};
use crate::config::CanvasConfig;
use crate::consts::PREVIEW_PARAGRAPHS;
use crate::content::{
    BrowserClock, Clock, ContentStore, Document, DocumentId, DocumentPatch, SAMPLE_DOCUMENTS, SystemClock,
    content_preview, first_line_preview,
};
use crate::error::{ConfigError, ErrorCode};
use crate::hit::{HitTarget, ResizeHandle, hit_test};
use crate::input::{Button, Cursor, InputState, Key, Modifiers, UiState, WheelDelta};
use crate::selection::{Selection, SelectionRect};
use crate::storage::{self, KeyValueStorage, LocalStorage, MemoryStorage};
use crate::surface::{self, DomSurface, MemorySurface, Surface};
use crate::visual::{VisualPatch, VisualState, VisualStore};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    DocumentCreated(DocumentId),
    DocumentUpdated(DocumentId),
    DocumentDeleted(DocumentId),
    /// Open the full editor for a document.
    OpenDocument(DocumentId),
    SelectionChanged,
    SetCursor(Cursor),
    RenderNeeded,
}

/// Namespaces changed since the last successful flush.
#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    visuals: bool,
    contents: bool,
    viewport: bool,
}

impl Dirty {
    fn all() -> Self {
        Self { visuals: true, contents: true, viewport: true }
    }
}

/// Core engine state: all logic that doesn't depend on the DOM.
///
/// Storage, surface and clock are injected so the whole interaction model
/// runs natively under test.
pub struct EngineCore {
    pub config: CanvasConfig,
    pub visuals: VisualStore,
    pub contents: ContentStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    storage: Box<dyn KeyValueStorage>,
    surface: Box<dyn Surface>,
    clock: Box<dyn Clock>,
    dirty: Dirty,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCore {
    /// Engine over in-memory storage and surface with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(
            CanvasConfig::default(),
            Box::new(MemoryStorage::new()),
            Box::new(MemorySurface::new()),
            Box::new(SystemClock),
        )
    }

    /// Build an engine and hydrate the stores from `storage`.
    #[must_use]
    pub fn with_parts(
        config: CanvasConfig,
        storage: Box<dyn KeyValueStorage>,
        surface: Box<dyn Surface>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let keys = &config.storage_keys;
        let visuals = storage::load_visuals(&*storage, &keys.visual_states);
        let contents = storage::load_contents(&*storage, &keys.content_states);
        let mut viewport = storage::load_viewport(&*storage, &keys.viewport_state);
        viewport.zoom = config.clamp_zoom(viewport.zoom);
        tracing::debug!(documents = contents.len(), placements = visuals.len(), zoom = viewport.zoom, "canvas state loaded");

        Self {
            config,
            visuals,
            contents,
            viewport,
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            storage,
            surface,
            clock,
            dirty: Dirty::default(),
        }
    }

    // =========================================================================
    // POINTER INPUT
    // =========================================================================

    /// Hit-test `screen_pt` and start whatever gesture the target calls for.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let target = self.hit_at(screen_pt);
        self.pointer_down_on(target, screen_pt, button, modifiers)
    }

    /// Start a gesture on a target the host already resolved.
    pub fn pointer_down_on(
        &mut self,
        target: HitTarget,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let actions = match target {
            HitTarget::Background => self.press_background(screen_pt),
            HitTarget::Body(id) => self.press_body(id, screen_pt, modifiers),
            HitTarget::Handle(id, handle) => self.press_handle(id, handle, screen_pt),
            HitTarget::Control(_) => Vec::new(),
        };
        if !self.input.is_idle() {
            tracing::debug!(state = self.input.name(), "gesture started");
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut input = std::mem::take(&mut self.input);
        let actions = match &mut input {
            InputState::Idle => Vec::new(),
            InputState::Selecting { rect, .. } => self.tick_select(rect, screen_pt),
            InputState::MultiDragging { start_screen, initial_positions, moved, .. } => {
                if screen_pt != *start_screen {
                    *moved = true;
                }
                self.tick_multi_drag(*start_screen, initial_positions, screen_pt)
            }
            InputState::Panning { start_screen, initial_pan } => self.tick_pan(*start_screen, *initial_pan, screen_pt),
            InputState::Dragging { id, start_screen, initial } => {
                self.tick_drag(id, *start_screen, *initial, screen_pt)
            }
            InputState::Resizing { id, handle, start_screen, initial } => {
                self.tick_resize(id, *handle, *start_screen, *initial, screen_pt)
            }
        };
        self.input = input;
        actions
    }

    /// Apply the final pointer position, commit the gesture, and return to idle.
    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        let mut actions = self.on_pointer_move(screen_pt);
        let ended = std::mem::take(&mut self.input);
        tracing::debug!(state = ended.name(), "gesture committed");
        let restore_cursor =
            self.ui.space_held || matches!(ended, InputState::Panning { .. } | InputState::Resizing { .. });

        match ended {
            InputState::MultiDragging { pressed: Some(id), toggled: false, moved: false, .. } => {
                if self.contents.contains(&id) {
                    self.ui.selection.select_only(id);
                    actions.push(Action::SelectionChanged);
                }
            }
            InputState::Selecting { rect, .. } if !rect.has_area() => {
                if !self.ui.selection.is_empty() {
                    self.ui.selection.clear();
                    actions.push(Action::SelectionChanged);
                }
            }
            _ => {}
        }

        if restore_cursor {
            actions.push(Action::SetCursor(self.cursor()));
        }
        self.finish_gesture(&mut actions);
        actions
    }

    /// The host lost the pointer (capture lost, touch cancelled).
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.abort()
    }

    /// Abort the active gesture, restoring the geometry, pan, or selection it
    /// had changed. No-op while idle.
    pub fn abort(&mut self) -> Vec<Action> {
        let aborted = std::mem::take(&mut self.input);
        let mut actions = Vec::new();
        let restore_cursor =
            self.ui.space_held || matches!(aborted, InputState::Panning { .. } | InputState::Resizing { .. });

        match &aborted {
            InputState::Idle => return actions,
            InputState::Panning { initial_pan, .. } => {
                self.viewport.pan = *initial_pan;
                self.dirty.viewport = true;
            }
            InputState::Dragging { id, initial, .. } => self.restore_position(id, *initial),
            InputState::MultiDragging { initial_positions, .. } => {
                for (id, initial) in initial_positions {
                    self.restore_position(id, *initial);
                }
            }
            InputState::Resizing { id, initial, .. } => {
                if self.contents.contains(id) {
                    self.visuals.set(id.clone(), *initial);
                    self.dirty.visuals = true;
                }
            }
            InputState::Selecting { prior, .. } => {
                let survivors = prior.iter().filter(|id| self.contents.contains(id)).cloned();
                self.ui.selection.set_all(survivors);
                actions.push(Action::SelectionChanged);
            }
        }

        tracing::debug!(state = aborted.name(), "gesture aborted");
        if restore_cursor {
            actions.push(Action::SetCursor(self.cursor()));
        }
        self.finish_gesture(&mut actions);
        actions
    }

    /// Double-click on a card body opens it.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.hit_at(screen_pt) {
            HitTarget::Body(id) => self.open_document(&id),
            _ => Vec::new(),
        }
    }

    /// Ctrl+wheel zooms about the viewport center. Plain wheel is ignored.
    pub fn on_wheel(&mut self, _screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if !modifiers.ctrl {
            return Vec::new();
        }
        let factor = if delta.dy > 0.0 {
            self.config.wheel_zoom_out
        } else if delta.dy < 0.0 {
            self.config.wheel_zoom_in
        } else {
            return Vec::new();
        };
        self.set_zoom(self.viewport.zoom * factor)
    }

    // =========================================================================
    // KEYBOARD INPUT
    // =========================================================================

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers, repeat: bool) -> Vec<Action> {
        if key.is_escape() {
            if self.ui.editing_title.is_some() {
                return self.cancel_title_edit();
            }
            return self.abort();
        }

        if key.is_space() {
            let selecting = matches!(self.input, InputState::Selecting { .. });
            if repeat || self.ui.space_held || self.ui.typing() || selecting {
                return Vec::new();
            }
            self.ui.space_held = true;
            if self.input.is_idle() {
                return vec![Action::SetCursor(Cursor::Grab)];
            }
            return Vec::new();
        }

        if key.is_delete() && !self.ui.typing() && self.input.is_idle() {
            return self.delete_selected();
        }

        Vec::new()
    }

    /// Tell the engine whether a host text field outside the canvas has
    /// focus. While it does, Space and Delete go to that field.
    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.ui.text_input_focused = focused;
    }

    /// Releasing Space disarms panning; an active pan keeps going.
    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if !key.is_space() || !self.ui.space_held {
            return Vec::new();
        }
        self.ui.space_held = false;
        if matches!(self.input, InputState::Panning { .. }) {
            return Vec::new();
        }
        vec![Action::SetCursor(self.cursor())]
    }

    // =========================================================================
    // VIEWPORT COMMANDS
    // =========================================================================

    /// Record the canvas element's CSS size. Zoom commands pivot on its
    /// center, so the host calls this on mount and on every resize.
    pub fn set_viewport_size(&mut self, width_css: f64, height_css: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
    }

    /// Set zoom (clamped), keeping the world point at the viewport center fixed.
    /// Before any `set_viewport_size` the pivot is the screen origin.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        let next = self.config.clamp_zoom(zoom);
        if (next - self.viewport.zoom).abs() < f64::EPSILON {
            return Vec::new();
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            tracing::debug!(zoom = next, "viewport size unset; zooming about the screen origin");
        }
        let center = Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0);
        self.viewport.zoom_about(next, center);
        self.dirty.viewport = true;
        self.flush();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.set_zoom(self.viewport.zoom + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.set_zoom(self.viewport.zoom - self.config.zoom_step)
    }

    /// Back to zoom 1 at the origin.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.viewport = Viewport::default();
        self.dirty.viewport = true;
        self.flush();
        vec![Action::RenderNeeded]
    }

    // =========================================================================
    // DOCUMENT COMMANDS
    // =========================================================================

    /// New untitled card near the visible top-left corner, selected.
    pub fn create_document(&mut self) -> Vec<Action> {
        let offset = self.config.new_doc_offset;
        let x = -self.viewport.pan.x / self.viewport.zoom + offset;
        let y = -self.viewport.pan.y / self.viewport.zoom + offset;
        let visual = VisualState::new(x, y, self.config.default_width, self.config.default_height);

        let id = self.contents.create(None, "", self.clock.now());
        self.visuals.set(id.clone(), visual);
        self.ui.selection.select_only(id.clone());
        self.dirty.contents = true;
        self.dirty.visuals = true;
        self.flush();
        tracing::debug!(id = %id, x, y, "document created");

        vec![Action::DocumentCreated(id), Action::SelectionChanged, Action::RenderNeeded]
    }

    /// Insert a document with explicit placement. Selection is unchanged.
    pub fn add_document(&mut self, title: &str, content: &str, visual: VisualState) -> DocumentId {
        let id = self.contents.create(Some(title), content, self.clock.now());
        self.visuals.set(id.clone(), visual);
        self.dirty.contents = true;
        self.dirty.visuals = true;
        self.flush();
        id
    }

    /// Seed the welcome documents into an empty workspace.
    pub fn seed_samples(&mut self) -> Vec<Action> {
        if !self.contents.is_empty() {
            return Vec::new();
        }
        let mut actions: Vec<Action> = SAMPLE_DOCUMENTS
            .iter()
            .map(|sample| {
                let visual = VisualState::new(sample.x, sample.y, sample.width, sample.height);
                Action::DocumentCreated(self.add_document(sample.title, sample.content, visual))
            })
            .collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn update_document(&mut self, id: &DocumentId, patch: &DocumentPatch) -> Vec<Action> {
        if !self.contents.update(id, patch, self.clock.now()) {
            return Vec::new();
        }
        self.dirty.contents = true;
        self.flush();
        vec![Action::DocumentUpdated(id.clone()), Action::RenderNeeded]
    }

    /// Remove a document's content and placement together.
    pub fn delete_document(&mut self, id: &DocumentId) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.remove_document(id, &mut actions) {
            return actions;
        }
        self.flush();
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Delete every selected document.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let ids: Vec<DocumentId> = self.ui.selection.iter().cloned().collect();
        let mut actions = Vec::new();
        let mut removed = false;
        for id in &ids {
            removed |= self.remove_document(id, &mut actions);
        }
        if removed {
            self.flush();
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Request the full editor for `id`.
    pub fn open_document(&mut self, id: &DocumentId) -> Vec<Action> {
        if !self.contents.contains(id) {
            return Vec::new();
        }
        vec![Action::OpenDocument(id.clone())]
    }

    fn remove_document(&mut self, id: &DocumentId, actions: &mut Vec<Action>) -> bool {
        let had_content = self.contents.delete(id).is_some();
        let had_visual = self.visuals.remove(id).is_some();
        if !had_content && !had_visual {
            return false;
        }
        self.dirty.contents |= had_content;
        self.dirty.visuals |= had_visual;
        if self.ui.editing_title.as_ref() == Some(id) {
            self.ui.editing_title = None;
        }
        actions.push(Action::DocumentDeleted(id.clone()));
        if self.ui.selection.remove(id) {
            actions.push(Action::SelectionChanged);
        }
        tracing::debug!(id = %id, "document deleted");
        true
    }

    // =========================================================================
    // TITLE EDITING
    // =========================================================================

    pub fn begin_title_edit(&mut self, id: &DocumentId) -> Vec<Action> {
        if !self.contents.contains(id) {
            return Vec::new();
        }
        self.ui.editing_title = Some(id.clone());
        vec![Action::RenderNeeded]
    }

    /// Save the edited title, trimmed. A blank title leaves the old one.
    pub fn commit_title_edit(&mut self, title: &str) -> Vec<Action> {
        let Some(id) = self.ui.editing_title.take() else {
            return Vec::new();
        };
        let title = title.trim();
        if title.is_empty() {
            return vec![Action::RenderNeeded];
        }
        let patch = DocumentPatch { title: Some(title.to_owned()), content: None };
        let mut actions = self.update_document(&id, &patch);
        if actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn cancel_title_edit(&mut self) -> Vec<Action> {
        if self.ui.editing_title.take().is_none() {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    // =========================================================================
    // RESET
    // =========================================================================

    /// Forget every placement. Cards fall back to the default geometry.
    pub fn clear_all_visuals(&mut self) -> Vec<Action> {
        self.visuals.clear();
        self.dirty.visuals = true;
        self.flush();
        self.resync();
        vec![Action::RenderNeeded]
    }

    /// Forget every document's content.
    pub fn clear_all_documents(&mut self) -> Vec<Action> {
        self.contents.clear();
        self.ui.selection.clear();
        self.ui.editing_title = None;
        self.dirty.contents = true;
        self.flush();
        vec![Action::SelectionChanged, Action::RenderNeeded]
    }

    /// Drop all state, in memory and in storage.
    pub fn reset(&mut self) -> Vec<Action> {
        self.visuals.clear();
        self.contents.clear();
        self.viewport = Viewport::default();
        self.ui = UiState { text_input_focused: self.ui.text_input_focused, ..UiState::default() };
        self.input = InputState::Idle;
        self.dirty = Dirty::default();

        let keys = self.config.storage_keys.clone();
        for key in [&keys.visual_states, &keys.content_states, &keys.viewport_state] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!(key = %key, code = e.error_code(), error = %e, "failed to clear canvas state");
            }
        }
        tracing::debug!("canvas reset");
        vec![Action::SelectionChanged, Action::SetCursor(Cursor::Default), Action::RenderNeeded]
    }

    // =========================================================================
    // PERSISTENCE & SURFACE
    // =========================================================================

    /// Write every dirty namespace. Failed writes stay dirty for the next flush.
    pub fn flush(&mut self) {
        let keys = &self.config.storage_keys;
        let backend = self.storage.as_mut();
        if self.dirty.visuals {
            self.dirty.visuals = !storage::save_namespace(backend, &keys.visual_states, &self.visuals);
        }
        if self.dirty.contents {
            self.dirty.contents = !storage::save_namespace(backend, &keys.content_states, &self.contents);
        }
        if self.dirty.viewport {
            self.dirty.viewport = !storage::save_namespace(backend, &keys.viewport_state, &self.viewport);
        }
    }

    /// Write all three namespaces regardless of what changed.
    pub fn persist(&mut self) {
        self.dirty = Dirty::all();
        self.flush();
    }

    /// Rewrite drifted surface styles from the store. Returns the write count.
    pub fn resync(&mut self) -> usize {
        let fallback = self.default_visual();
        surface::resync(self.surface.as_mut(), &self.visuals, fallback)
    }

    fn finish_gesture(&mut self, actions: &mut Vec<Action>) {
        self.flush();
        let writes = self.resync();
        if writes > 0 {
            tracing::debug!(writes, "surface resynced");
        }
        actions.push(Action::RenderNeeded);
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Documents in render order.
    #[must_use]
    pub fn documents(&self) -> Vec<&Document> {
        self.contents.all()
    }

    #[must_use]
    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.contents.get(id)
    }

    /// Placement of `id`, or the default card geometry if none is stored.
    #[must_use]
    pub fn visual(&self, id: &DocumentId) -> VisualState {
        self.visuals.get_or(id, self.default_visual())
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.ui.selection
    }

    /// The rubber band being drawn, normalized, in world coordinates.
    #[must_use]
    pub fn selection_rect(&self) -> Option<VisualState> {
        match &self.input {
            InputState::Selecting { rect, .. } => Some(rect.bounds()),
            _ => None,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn zoom_percent(&self) -> i64 {
        self.viewport.zoom_percent()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        match self.input {
            InputState::Panning { .. } => Cursor::Grabbing,
            InputState::Resizing { handle, .. } => Cursor::Resize(handle),
            _ if self.ui.space_held => Cursor::Grab,
            _ => Cursor::Default,
        }
    }

    #[must_use]
    pub fn is_editing_title(&self, id: &DocumentId) -> bool {
        self.ui.editing_title.as_ref() == Some(id)
    }

    /// Body text shown on the card.
    #[must_use]
    pub fn card_preview(&self, id: &DocumentId) -> Option<String> {
        self.contents.get(id).map(|doc| content_preview(&doc.content, PREVIEW_PARAGRAPHS))
    }

    /// One-line summary for the document list.
    #[must_use]
    pub fn sidebar_preview(&self, id: &DocumentId) -> Option<String> {
        self.contents.get(id).map(|doc| first_line_preview(&doc.content))
    }

    // =========================================================================
    // GESTURE ENTRY
    // =========================================================================

    fn hit_at(&self, screen_pt: Point) -> HitTarget {
        let world = self.viewport.screen_to_world(screen_pt);
        let order = self.contents.ids();
        hit_test(
            world,
            &order,
            &self.visuals,
            self.default_visual(),
            &self.viewport,
            &self.ui.selection,
            self.config.handle_radius_px,
        )
    }

    fn press_background(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.ui.space_held {
            self.input = InputState::Panning { start_screen: screen_pt, initial_pan: self.viewport.pan };
            return vec![Action::SetCursor(Cursor::Grabbing)];
        }

        let world = self.viewport.screen_to_world(screen_pt);
        let inside_selected = self.ui.selection.iter().any(|id| self.visual(id).contains(world));
        if inside_selected {
            self.start_multi_drag(screen_pt, None, false);
            return Vec::new();
        }

        let prior = self.ui.selection.clone();
        self.ui.selection.clear();
        self.input = InputState::Selecting { rect: SelectionRect::at(world), prior: prior.clone() };
        if prior.is_empty() { Vec::new() } else { vec![Action::SelectionChanged] }
    }

    fn press_body(&mut self, id: DocumentId, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if !self.contents.contains(&id) {
            return Vec::new();
        }

        if modifiers.multi_select() {
            let now_selected = self.ui.selection.toggle(&id);
            if now_selected {
                if self.ui.selection.is_multi() {
                    self.start_multi_drag(screen_pt, Some(id), true);
                } else {
                    self.start_drag(id, screen_pt);
                }
            }
            return vec![Action::SelectionChanged];
        }

        if self.ui.selection.is_multi() && self.ui.selection.contains(&id) {
            self.start_multi_drag(screen_pt, Some(id), false);
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.ui.selection.primary() != Some(&id) {
            self.ui.selection.select_only(id.clone());
            actions.push(Action::SelectionChanged);
        }
        self.start_drag(id, screen_pt);
        actions
    }

    fn press_handle(&mut self, id: DocumentId, handle: ResizeHandle, screen_pt: Point) -> Vec<Action> {
        if !self.contents.contains(&id) || !self.ui.selection.contains(&id) {
            return Vec::new();
        }
        let initial = self.visual(&id);
        self.input = InputState::Resizing { id, handle, start_screen: screen_pt, initial };
        vec![Action::SetCursor(Cursor::Resize(handle))]
    }

    fn start_drag(&mut self, id: DocumentId, screen_pt: Point) {
        let initial = self.visual(&id).origin();
        self.input = InputState::Dragging { id, start_screen: screen_pt, initial };
    }

    fn start_multi_drag(&mut self, screen_pt: Point, pressed: Option<DocumentId>, toggled: bool) {
        let initial_positions = self
            .ui
            .selection
            .iter()
            .filter(|id| self.contents.contains(id))
            .map(|id| (id.clone(), self.visual(id).origin()))
            .collect();
        self.input = InputState::MultiDragging {
            start_screen: screen_pt,
            initial_positions,
            pressed,
            toggled,
            moved: false,
        };
    }

    // =========================================================================
    // GESTURE TICKS
    // =========================================================================

    fn tick_select(&mut self, rect: &mut SelectionRect, screen_pt: Point) -> Vec<Action> {
        rect.end = self.viewport.screen_to_world(screen_pt);
        let mut next = Selection::new();
        if rect.has_area() {
            let ids = self.contents.ids();
            next.set_all(rect.members(&ids, &self.visuals, self.default_visual()));
        }

        let mut actions = Vec::new();
        if next != self.ui.selection {
            self.ui.selection = next;
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn tick_multi_drag(
        &mut self,
        start_screen: Point,
        initial_positions: &[(DocumentId, Point)],
        screen_pt: Point,
    ) -> Vec<Action> {
        let delta = self.viewport.screen_delta_to_world(screen_pt.sub(start_screen));
        for (id, initial) in initial_positions {
            self.move_card(id, initial.add(delta));
        }
        Vec::new()
    }

    fn tick_pan(&mut self, start_screen: Point, initial_pan: Point, screen_pt: Point) -> Vec<Action> {
        self.viewport.pan = initial_pan.add(screen_pt.sub(start_screen));
        self.dirty.viewport = true;
        vec![Action::RenderNeeded]
    }

    fn tick_drag(&mut self, id: &DocumentId, start_screen: Point, initial: Point, screen_pt: Point) -> Vec<Action> {
        let delta = self.viewport.screen_delta_to_world(screen_pt.sub(start_screen));
        self.move_card(id, initial.add(delta));
        Vec::new()
    }

    fn tick_resize(
        &mut self,
        id: &DocumentId,
        handle: ResizeHandle,
        start_screen: Point,
        initial: VisualState,
        screen_pt: Point,
    ) -> Vec<Action> {
        if !self.contents.contains(id) {
            return Vec::new();
        }
        let delta = self.viewport.screen_delta_to_world(screen_pt.sub(start_screen));
        let raw_width = if handle.moves_west() { initial.width - delta.x } else { initial.width + delta.x };
        let raw_height = if handle.moves_north() { initial.height - delta.y } else { initial.height + delta.y };

        // Clamp first, then derive the moving edge so the opposite edge stays put.
        let width = raw_width.max(self.config.min_width);
        let x = if handle.moves_west() { initial.x + (initial.width - width) } else { initial.x };
        let height = raw_height.max(self.config.min_height);
        let y = if handle.moves_north() { initial.y + (initial.height - height) } else { initial.y };

        let patch = VisualPatch::geometry(VisualState::new(x, y, width, height));
        let state = self.visuals.update(id, patch, self.default_visual());
        self.dirty.visuals = true;
        if !surface::write_geometry(self.surface.as_mut(), id, &state) {
            tracing::warn!(id = %id, "card element not mounted; skipping resize write");
        }
        Vec::new()
    }

    fn move_card(&mut self, id: &DocumentId, to: Point) {
        if !self.contents.contains(id) {
            return;
        }
        let state = self.visuals.update(id, VisualPatch::position(to), self.default_visual());
        self.dirty.visuals = true;
        if !surface::write_position(self.surface.as_mut(), id, &state) {
            tracing::warn!(id = %id, "card element not mounted; skipping move write");
        }
    }

    fn restore_position(&mut self, id: &DocumentId, initial: Point) {
        if self.contents.contains(id) {
            self.visuals.update(id, VisualPatch::position(initial), self.default_visual());
            self.dirty.visuals = true;
        }
    }

    fn default_visual(&self) -> VisualState {
        VisualState::new(0.0, 0.0, self.config.default_width, self.config.default_height)
    }
}

/// The browser engine. Wraps `EngineCore` over `localStorage` and the host's
/// card elements.
pub struct Engine {
    surface: DomSurface,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to `window.localStorage`. Without local storage
    /// the canvas still works but nothing survives a reload. Call
    /// [`Engine::set_viewport_size`] before the first zoom.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        let storage: Box<dyn KeyValueStorage> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "local storage unavailable; canvas state will not persist");
                Box::new(MemoryStorage::new())
            }
        };
        let surface = DomSurface::new();
        let core = EngineCore::with_parts(config, storage, Box::new(surface.clone()), Box::new(BrowserClock));
        Self { surface, core }
    }

    /// Create an engine from a host-supplied JSON config.
    ///
    /// # Errors
    ///
    /// Returns the parse or validation error for a bad config.
    pub fn from_config_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(CanvasConfig::from_json(raw)?))
    }

    // --- Elements ---

    /// Register the element rendering `id` and bring its styles up to date.
    pub fn mount(&mut self, id: DocumentId, element: web_sys::HtmlElement) {
        self.surface.mount(id, element);
        self.core.resync();
    }

    pub fn unmount(&mut self, id: &DocumentId) {
        self.surface.unmount(id);
    }

    pub fn set_viewport_size(&mut self, width_css: f64, height_css: f64) {
        self.core.set_viewport_size(width_css, height_css);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn pointer_down_on(
        &mut self,
        target: HitTarget,
        screen_pt: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.core.pointer_down_on(target, screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt)
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.core.on_pointer_cancel()
    }

    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_double_click(screen_pt)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, repeat: bool) -> Vec<Action> {
        self.core.on_key_down(key, modifiers, repeat)
    }

    pub fn on_key_up(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_up(key, modifiers)
    }

    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.core.set_text_input_focused(focused);
    }

    // --- Commands ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.core.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.core.zoom_out()
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.core.reset_view()
    }

    pub fn create_document(&mut self) -> Vec<Action> {
        self.core.create_document()
    }

    pub fn seed_samples(&mut self) -> Vec<Action> {
        self.core.seed_samples()
    }

    pub fn delete_document(&mut self, id: &DocumentId) -> Vec<Action> {
        self.core.delete_document(id)
    }

    pub fn update_document(&mut self, id: &DocumentId, patch: &DocumentPatch) -> Vec<Action> {
        self.core.update_document(id, patch)
    }

    pub fn open_document(&mut self, id: &DocumentId) -> Vec<Action> {
        self.core.open_document(id)
    }

    pub fn begin_title_edit(&mut self, id: &DocumentId) -> Vec<Action> {
        self.core.begin_title_edit(id)
    }

    pub fn commit_title_edit(&mut self, title: &str) -> Vec<Action> {
        self.core.commit_title_edit(title)
    }

    pub fn cancel_title_edit(&mut self) -> Vec<Action> {
        self.core.cancel_title_edit()
    }

    pub fn reset(&mut self) -> Vec<Action> {
        self.core.reset()
    }

    /// Persist everything, e.g. from a `pagehide` handler.
    pub fn persist(&mut self) {
        self.core.persist();
    }
}
