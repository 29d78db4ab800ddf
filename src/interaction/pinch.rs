use crate::config::EditorConfig;

/// Horizontal zoom of the timeline, driven by pinch gestures and the zoom
/// buttons. Purely visual: time values are never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchZoom {
    zoom: f32,
    min: f32,
    max: f32,
    step: f32,
    sensitivity: f32,
    /// Distance between the two touch points at the last event.
    last_distance: Option<f32>,
}

impl PinchZoom {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0_f32.clamp(config.zoom_min, config.zoom_max),
            min: config.zoom_min,
            max: config.zoom_max,
            step: config.zoom_step,
            sensitivity: config.pinch_sensitivity,
            last_distance: None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_pinching(&self) -> bool {
        self.last_distance.is_some()
    }

    /// Starts a pinch when exactly two touch points are down.
    pub fn touch_start(&mut self, points: &[(f32, f32)]) {
        self.last_distance = two_point_distance(points);
    }

    /// Applies the change in distance since the last event. Returns the new
    /// zoom, or `None` if no pinch is in progress.
    pub fn touch_move(&mut self, points: &[(f32, f32)]) -> Option<f32> {
        let last = self.last_distance?;
        let distance = two_point_distance(points)?;
        self.set_zoom(self.zoom + (distance - last) * self.sensitivity);
        self.last_distance = Some(distance);
        Some(self.zoom)
    }

    pub fn touch_end(&mut self) {
        self.last_distance = None;
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.zoom + self.step);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.zoom - self.step);
        self.zoom
    }

    /// Pinch delta reported directly by the windowing layer (trackpads).
    pub fn apply_factor(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.set_zoom(self.zoom * factor);
        }
    }

    fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min, self.max);
        }
    }
}

fn two_point_distance(points: &[(f32, f32)]) -> Option<f32> {
    match points {
        [(x1, y1), (x2, y2)] => Some((x2 - x1).hypot(y2 - y1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinch() -> PinchZoom {
        PinchZoom::new(&EditorConfig::default())
    }

    #[test]
    fn test_incremental_pinch() {
        let mut zoom = pinch();
        zoom.touch_start(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(zoom.touch_move(&[(0.0, 0.0), (150.0, 0.0)]), Some(1.5));
        let zoomed = zoom.touch_move(&[(0.0, 0.0), (130.0, 0.0)]).unwrap();
        assert!((zoomed - 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_clamped_for_any_input() {
        let mut zoom = pinch();
        zoom.touch_start(&[(0.0, 0.0), (10.0, 0.0)]);
        zoom.touch_move(&[(0.0, 0.0), (1.0e7, 0.0)]);
        assert_eq!(zoom.zoom(), 4.0);
        zoom.touch_move(&[(0.0, 0.0), (0.0, 0.0)]);
        assert_eq!(zoom.zoom(), 0.25);
        zoom.apply_factor(f32::INFINITY);
        assert_eq!(zoom.zoom(), 0.25);
    }

    #[test]
    fn test_single_touch_does_not_pinch() {
        let mut zoom = pinch();
        zoom.touch_start(&[(0.0, 0.0)]);
        assert!(!zoom.is_pinching());
        assert_eq!(zoom.touch_move(&[(0.0, 0.0), (500.0, 0.0)]), None);
        assert_eq!(zoom.zoom(), 1.0);
    }

    #[test]
    fn test_buttons_step_and_clamp() {
        let mut zoom = pinch();
        assert_eq!(zoom.zoom_in(), 1.25);
        for _ in 0..20 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.zoom(), 4.0);
        for _ in 0..20 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.zoom(), 0.25);
    }
}
