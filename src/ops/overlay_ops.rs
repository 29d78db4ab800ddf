use crate::types::text_overlay::{Position, TextOverlay};

/// Shifts a `[start, end]` window by `delta` seconds, keeping its length.
/// A window pushed before zero is stopped at zero, still keeping its length.
pub fn shifted_window(start: f64, end: f64, delta: f64) -> (f64, f64) {
    let span = end - start;
    let delta = if delta.is_finite() { delta } else { 0.0 };
    let new_start = (start + delta).max(0.0);
    (new_start, new_start + span)
}

/// Rounds `time` to the nearest multiple of `interval`. A non-positive
/// interval disables snapping.
pub fn snap_time(time: f64, interval: f64) -> f64 {
    if interval > 0.0 {
        (time / interval).round() * interval
    } else {
        time
    }
}

/// Rounds a canvas coordinate to the grid.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid > 0.0 {
        (value / grid).round() * grid
    } else {
        value
    }
}

pub fn nudged(position: Position, dx: f32, dy: f32) -> Position {
    Position {
        left: position.left + dx,
        top: position.top + dy,
    }
}

/// Uniform scale factor from a free two-axis scale gesture.
pub fn uniform_scale(scale_x: f32, scale_y: f32) -> f32 {
    scale_x.max(scale_y)
}

/// Copy of `text` moved by `offset` px on both axes, for duplicates made from
/// the canvas where the offset is configurable.
pub fn offset_copy(text: &TextOverlay, offset: f32) -> TextOverlay {
    let mut copy = text.clone();
    copy.id = String::new();
    copy.position = nudged(text.position, offset, offset);
    copy
}
