use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Zoom range the timeline supports; configured bounds must stay inside it.
pub const ZOOM_FLOOR: f32 = 0.25;
pub const ZOOM_CEILING: f32 = 4.0;

/// Tunables for the editor. Every field has a default so a partial TOML file
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Divergence (seconds) tolerated between the playhead and the waveform
    /// cursor before the waveform is re-seeked.
    pub sync_tolerance: f64,
    /// Smallest width (px) a subtitle block is drawn with.
    pub min_block_width: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    /// Zoom change per pixel of pinch distance change.
    pub pinch_sensitivity: f32,
    pub subtitle_default_span: f64,
    pub text_default_span: f64,
    pub duplicate_offset_px: f32,
    pub nudge_step_px: f32,
    pub nudge_step_fast_px: f32,
    pub canvas_grid_px: f32,
    /// Snap interval (seconds) for dragged subtitle blocks. `0` disables snapping.
    pub drag_snap_interval: f64,
    pub translate_pacing_ms: u64,
    pub dub_pacing_ms: u64,
    pub video_width: f32,
    pub video_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            sync_tolerance: 0.1,
            min_block_width: 4.0,
            zoom_min: ZOOM_FLOOR,
            zoom_max: ZOOM_CEILING,
            zoom_step: 0.25,
            pinch_sensitivity: 0.01,
            subtitle_default_span: 2.0,
            text_default_span: 3.0,
            duplicate_offset_px: 20.0,
            nudge_step_px: 1.0,
            nudge_step_fast_px: 10.0,
            canvas_grid_px: 10.0,
            drag_snap_interval: 0.0,
            translate_pacing_ms: 100,
            dub_pacing_ms: 200,
            video_width: 854.0,
            video_height: 480.0,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from the path in `CUTLINE_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Self {
        match std::env::var("CUTLINE_CONFIG") {
            Ok(path) => match Self::load(&path) {
                Ok(config) => {
                    log::info!("Loaded editor config from {}", path);
                    config
                }
                Err(err) => {
                    log::warn!("Ignoring config at {}: {}", path, err);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn translate_pacing(&self) -> Duration {
        Duration::from_millis(self.translate_pacing_ms)
    }

    pub fn dub_pacing(&self) -> Duration {
        Duration::from_millis(self.dub_pacing_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let allowed = ZOOM_FLOOR..=ZOOM_CEILING;
        if !(allowed.contains(&self.zoom_min) && allowed.contains(&self.zoom_max) && self.zoom_min <= self.zoom_max) {
            return Err(ConfigError::Invalid {
                field: "zoom_min",
                reason: format!(
                    "expected {} <= zoom_min <= zoom_max <= {}, got {} and {}",
                    ZOOM_FLOOR, ZOOM_CEILING, self.zoom_min, self.zoom_max
                ),
            });
        }
        if !(self.sync_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "sync_tolerance",
                reason: format!("must be non-negative, got {}", self.sync_tolerance),
            });
        }
        if !(self.video_width > 0.0 && self.video_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "video_width",
                reason: "video canvas must have a positive size".to_string(),
            });
        }
        Ok(())
    }
}
