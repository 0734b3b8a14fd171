//! Canvas configuration: geometry bounds, zoom policy, and storage keys.
//!
//! Every field has a default from [`crate::consts`], so a host can pass a
//! sparse JSON object (or nothing at all) and override only what it needs.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Storage keys for the three persisted namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub visual_states: String,
    pub content_states: String,
    pub viewport_state: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            visual_states: VISUAL_STATES_KEY.to_owned(),
            content_states: CONTENT_STATES_KEY.to_owned(),
            viewport_state: VIEWPORT_STATE_KEY.to_owned(),
        }
    }
}

/// Tunable canvas behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub min_width: f64,
    pub min_height: f64,
    pub default_width: f64,
    pub default_height: f64,
    /// World offset from the visible top-left corner for new cards.
    pub new_doc_offset: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    /// Screen-space hit radius of resize handles.
    pub handle_radius_px: f64,
    pub storage_keys: StorageKeys,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_DOC_WIDTH,
            min_height: MIN_DOC_HEIGHT,
            default_width: DEFAULT_DOC_WIDTH,
            default_height: DEFAULT_DOC_HEIGHT,
            new_doc_offset: NEW_DOC_OFFSET,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            zoom_step: ZOOM_STEP,
            wheel_zoom_in: WHEEL_ZOOM_IN,
            wheel_zoom_out: WHEEL_ZOOM_OUT,
            handle_radius_px: HANDLE_RADIUS_PX,
            storage_keys: StorageKeys::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly sparse) JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed JSON and `Invalid` when a bound is out
    /// of range (see [`CanvasConfig::validate`]).
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that bounds are positive, finite, and ordered.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_width", self.min_width)?;
        positive("min_height", self.min_height)?;
        positive("default_width", self.default_width)?;
        positive("default_height", self.default_height)?;
        positive("zoom_min", self.zoom_min)?;
        positive("zoom_max", self.zoom_max)?;
        positive("zoom_step", self.zoom_step)?;
        positive("wheel_zoom_in", self.wheel_zoom_in)?;
        positive("wheel_zoom_out", self.wheel_zoom_out)?;
        if !self.new_doc_offset.is_finite() {
            return Err(invalid("new_doc_offset", "must be finite"));
        }
        if !self.handle_radius_px.is_finite() || self.handle_radius_px < 0.0 {
            return Err(invalid("handle_radius_px", "must be a non-negative number"));
        }
        if self.zoom_min > self.zoom_max {
            return Err(invalid("zoom_min", format!("{} exceeds zoom_max {}", self.zoom_min, self.zoom_max)));
        }
        if self.default_width < self.min_width {
            return Err(invalid("default_width", "smaller than min_width"));
        }
        if self.default_height < self.min_height {
            return Err(invalid("default_height", "smaller than min_height"));
        }
        let keys = &self.storage_keys;
        if keys.visual_states.is_empty() || keys.content_states.is_empty() || keys.viewport_state.is_empty() {
            return Err(invalid("storage_keys", "keys must be non-empty"));
        }
        if keys.visual_states == keys.content_states
            || keys.visual_states == keys.viewport_state
            || keys.content_states == keys.viewport_state
        {
            return Err(invalid("storage_keys", "keys must be distinct"));
        }
        Ok(())
    }

    /// Clamp a zoom factor into the configured range.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.zoom_min, self.zoom_max)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}
