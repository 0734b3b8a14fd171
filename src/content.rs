//! Content store: document titles, bodies, and timestamps.
//!
//! Independent of visual placement; a document exists on the canvas when it
//! has an entry here, and its card geometry lives in [`crate::visual`].
//! Timestamps are persisted as RFC 3339 strings, which also accepts what a
//! browser's `Date.toISOString()` produces.

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::consts::{DEFAULT_TITLE, FIRST_LINE_MAX_CHARS, PREVIEW_MAX_CHARS};

/// Opaque document identifier.
///
/// New ids are UUID v4 strings. Ids read back from storage are kept verbatim,
/// whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Mint a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A text document as stored and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Sparse content update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Source of "now" for document timestamps.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Wall clock from the browser's `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> OffsetDateTime {
        let nanos = (js_sys::Date::now() * 1_000_000.0) as i128;
        match OffsetDateTime::from_unix_timestamp_nanos(nanos) {
            Ok(now) => now,
            Err(e) => {
                tracing::warn!(error = %e, "browser clock out of range; using epoch");
                OffsetDateTime::UNIX_EPOCH
            }
        }
    }
}

/// In-memory map of documents keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentStore {
    documents: HashMap<DocumentId, Document>,
}

impl ContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document and return its id. `None` titles become
    /// `"Untitled Document"`.
    pub fn create(&mut self, title: Option<&str>, content: &str, now: OffsetDateTime) -> DocumentId {
        let id = DocumentId::generate();
        let doc = Document {
            id: id.clone(),
            title: title.unwrap_or(DEFAULT_TITLE).to_owned(),
            content: content.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.documents.insert(id.clone(), doc);
        id
    }

    /// Insert or replace a document under its own id.
    pub fn insert(&mut self, doc: Document) {
        self.documents.insert(doc.id.clone(), doc);
    }

    /// Apply `patch` and refresh `updated_at`. Returns false if the document
    /// doesn't exist.
    pub fn update(&mut self, id: &DocumentId, patch: &DocumentPatch, now: OffsetDateTime) -> bool {
        let Some(doc) = self.documents.get_mut(id) else {
            return false;
        };
        if let Some(ref title) = patch.title {
            doc.title.clone_from(title);
        }
        if let Some(ref content) = patch.content {
            doc.content.clone_from(content);
        }
        doc.updated_at = now;
        true
    }

    /// Remove a document by id, returning it if it was present.
    pub fn delete(&mut self, id: &DocumentId) -> Option<Document> {
        self.documents.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// All documents ordered by `(created_at, id)`; this is the render order.
    #[must_use]
    pub fn all(&self) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self.documents.values().collect();
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        docs
    }

    /// Ids in render order.
    #[must_use]
    pub fn ids(&self) -> Vec<DocumentId> {
        self.all().into_iter().map(|d| d.id.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for ContentStore {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self { documents: iter.into_iter().map(|d| (d.id.clone(), d)).collect() }
    }
}

// ── Previews ────────────────────────────────────────────────────

/// Card preview: the first `max_paragraphs` paragraphs, `...` when more
/// exist, capped at 300 characters.
///
/// Paragraphs break on blank lines and before bullet lines (`-`, `*`, `•`).
/// Content that forms a single paragraph over several lines previews its
/// first `max_paragraphs` non-blank lines instead.
#[must_use]
pub fn content_preview(content: &str, max_paragraphs: usize) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    let paragraphs = split_paragraphs(content);
    if paragraphs.is_empty() {
        return String::new();
    }

    if paragraphs.len() == 1 {
        let lines: Vec<&str> = content.split('\n').filter(|l| !l.trim().is_empty()).collect();
        if lines.len() > 1 {
            let mut preview = lines[..max_paragraphs.min(lines.len())].join("\n");
            if lines.len() > max_paragraphs {
                preview.push_str("...");
            }
            return cap_chars(preview, PREVIEW_MAX_CHARS);
        }
    }

    let mut preview = paragraphs[..max_paragraphs.min(paragraphs.len())].join("\n\n");
    if paragraphs.len() > max_paragraphs {
        preview.push_str("...");
    }
    cap_chars(preview, PREVIEW_MAX_CHARS)
}

/// Sidebar preview: the first line, cut at 50 characters.
#[must_use]
pub fn first_line_preview(content: &str) -> String {
    let first = content.split('\n').next().unwrap_or_default();
    if first.is_empty() {
        return "Empty document".to_owned();
    }
    if first.chars().count() > FIRST_LINE_MAX_CHARS {
        let cut: String = first.chars().take(FIRST_LINE_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        first.to_owned()
    }
}

fn split_paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.split('\n') {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            flush_paragraph(&mut current, &mut paragraphs);
            continue;
        }
        if trimmed.starts_with(['-', '*', '•']) {
            flush_paragraph(&mut current, &mut paragraphs);
        }
        current.push(line);
    }
    flush_paragraph(&mut current, &mut paragraphs);
    paragraphs
}

fn flush_paragraph(current: &mut Vec<&str>, out: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let joined = current.join("\n");
    current.clear();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_owned());
    }
}

fn cap_chars(preview: String, max: usize) -> String {
    if preview.chars().count() <= max {
        return preview;
    }
    let cut: String = preview.chars().take(max).collect();
    format!("{}...", cut.trim())
}

// ── Samples ─────────────────────────────────────────────────────

/// A starter document placed on an empty canvas.
#[derive(Debug, Clone, Copy)]
pub struct SampleDocument {
    pub title: &'static str,
    pub content: &'static str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Welcome documents seeded into an empty workspace.
pub const SAMPLE_DOCUMENTS: [SampleDocument; 3] = [
    SampleDocument {
        title: "My First Document",
        content: "Welcome to the canvas.\n\nEvery card here is a document. Drag a card to move it, pull a corner handle to resize it, and hold Space while dragging the background to pan.\n\nDouble-click a card to open it. Changes are saved in this browser.",
        x: 100.0,
        y: 100.0,
        width: 300.0,
        height: 200.0,
    },
    SampleDocument {
        title: "Ideas & Notes",
        content: "A place for loose thoughts.\n• Brainstorming\n• Meeting notes\n• Project ideas\n\nDrag across the background to select several cards at once.",
        x: 500.0,
        y: 150.0,
        width: 280.0,
        height: 180.0,
    },
    SampleDocument {
        title: "Project Planning",
        content: "Break work into pieces.\n\n## Milestones\n1. Research\n2. Design\n3. Build\n4. Launch\n\n## Resources\n- People\n- Budget\n- Timeline",
        x: 200.0,
        y: 400.0,
        width: 320.0,
        height: 220.0,
    },
];
