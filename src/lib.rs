//! Interaction engine for the cmddr document canvas.
//!
//! Compiled to WebAssembly and driven by a browser host. Document cards live
//! on an infinite, pannable and zoomable canvas; the engine turns raw pointer,
//! wheel and keyboard events into pans, drags, multi-drags, corner resizes and
//! rubber-band selections, and keeps three stores (card placement, document
//! content, viewport) persisted in `localStorage`. The host renders the cards
//! and forwards events; it reacts to the [`engine::Action`]s returned.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`camera`] | Viewport pan/zoom and coordinate conversions |
//! | [`visual`] | Per-document placement store |
//! | [`content`] | Document store, timestamps, previews, sample documents |
//! | [`selection`] | Selection set and rubber-band rectangle |
//! | [`hit`] | Hit-testing card bodies and resize handles |
//! | [`storage`] | Key-value storage backends and namespace load/save |
//! | [`surface`] | Card style output and post-gesture resync |
//! | [`config`] | Tunable limits and storage keys |
//! | [`error`] | Storage and config error types |
//! | [`consts`] | Shared constants (size minimums, zoom limits, storage keys) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod content;
pub mod engine;
pub mod error;
pub mod hit;
pub mod input;
pub mod selection;
pub mod storage;
pub mod surface;
pub mod visual;
