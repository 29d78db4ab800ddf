//! Time to pixel mapping for a track strip.

use crate::types::overlay::Overlay;
use crate::types::time::{clamp_time, known_duration};

/// Linear mapping between seconds and strip pixels. Only exists for a
/// positive width and a known duration, so callers can never produce NaN
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackScale {
    px_per_sec: f64,
    duration: f64,
}

impl TrackScale {
    pub fn new(width_px: f32, duration: Option<f64>) -> Option<Self> {
        let duration = known_duration(duration)?;
        let width = f64::from(width_px);
        if !(width.is_finite() && width > 0.0) {
            return None;
        }
        Some(Self {
            px_per_sec: width / duration,
            duration,
        })
    }

    pub fn px_per_sec(&self) -> f64 {
        self.px_per_sec
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time_to_x(&self, time: f64) -> f32 {
        let time = if time.is_finite() { time } else { 0.0 };
        (time * self.px_per_sec) as f32
    }

    /// Strip x to time, clamped into `[0, duration]`.
    pub fn x_to_time(&self, x: f32) -> f64 {
        clamp_time(f64::from(x) / self.px_per_sec, Some(self.duration))
    }

    /// Pixel delta to a time delta (unclamped).
    pub fn dx_to_dt(&self, dx: f32) -> f64 {
        f64::from(dx) / self.px_per_sec
    }

    pub fn playhead_x(&self, now: f64) -> f32 {
        self.time_to_x(clamp_time(now, Some(self.duration)))
    }
}

/// Where an overlay block is drawn on the strip.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRect {
    pub id: String,
    pub x: f32,
    pub width: f32,
}

impl BlockRect {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.x && x <= self.x + self.width
    }
}

pub fn block_rects<T: Overlay>(items: &[T], scale: &TrackScale, min_width: f32) -> Vec<BlockRect> {
    items
        .iter()
        .map(|item| {
            let x = scale.time_to_x(item.start());
            let width = (scale.time_to_x(item.end()) - x).max(min_width);
            BlockRect {
                id: item.id().to_string(),
                x,
                width,
            }
        })
        .collect()
}

/// Block under `x`. Later blocks are drawn on top and win.
pub fn block_at(rects: &[BlockRect], x: f32) -> Option<&BlockRect> {
    rects.iter().rev().find(|rect| rect.contains(x))
}

/// Seek target for a click on the strip background. Clicks that land on a
/// block, or that end a drag, do not seek.
pub fn click_seek_target(scale: Option<&TrackScale>, x: f32, on_block: bool, dragging: bool) -> Option<f64> {
    if on_block || dragging || !x.is_finite() {
        return None;
    }
    scale.map(|scale| scale.x_to_time(x))
}

/// Scrub position from a pointer over the track area, as a fraction of its
/// width.
pub fn scrub_target(x: f32, width: f32, duration: Option<f64>) -> Option<f64> {
    let duration = known_duration(duration)?;
    if !(width > 0.0) || !x.is_finite() {
        return None;
    }
    let fraction = f64::from((x / width).clamp(0.0, 1.0));
    Some(fraction * duration)
}

/// Major and minor tick intervals (seconds) for a zoom level.
pub fn ruler_intervals(px_per_sec: f64) -> (f64, f64) {
    if px_per_sec > 200.0 {
        (1.0, 0.1)
    } else if px_per_sec > 50.0 {
        (5.0, 1.0)
    } else {
        (10.0, 5.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerTick {
    pub time: f64,
    pub x: f32,
    pub major: bool,
}

pub fn ruler_ticks(scale: &TrackScale) -> Vec<RulerTick> {
    let (major, minor) = ruler_intervals(scale.px_per_sec());
    let count = (scale.duration() / minor).floor() as usize;
    (0..=count)
        .map(|i| {
            let time = i as f64 * minor;
            let ratio = time / major;
            RulerTick {
                time,
                x: scale.time_to_x(time),
                major: (ratio - ratio.round()).abs() < 1e-6,
            }
        })
        .collect()
}
