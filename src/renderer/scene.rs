//! Canvas scene for free text.
//!
//! The scene is derived state: every tick it is rebuilt from the text store,
//! and every edit made on the canvas is written to the store first. The only
//! things the scene owns are the selection and the start times of running
//! entrance animations.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::EditorConfig;
use crate::interaction::keyboard::CanvasCommand;
use crate::ops::overlay_ops::{nudged, offset_copy, snap_to_grid, uniform_scale};
use crate::renderer::overlay_renderer::parse_hex_color;
use crate::renderer::time_player_bridge::{TimeUpdate, TimeView};
use crate::store::TextStore;
use crate::types::text_overlay::{
    Animation, InteractionFlags, Position, TextOverlay, TextPatch, TextStyle, VisualFlags,
};

pub const SLIDE_DISTANCE_PX: f32 = 50.0;

/// Monotonic milliseconds for animation timing.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Overshoots past 1 before settling.
pub fn ease_out_back(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

pub fn ease_out_bounce(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

pub fn entrance_duration_ms(animation: Animation) -> f64 {
    match animation {
        Animation::None => 0.0,
        Animation::FadeIn | Animation::SlideUp | Animation::BounceIn => 500.0,
        Animation::ScaleIn => 400.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceState {
    pub animation: Animation,
    /// Linear progress in `[0, 1]`.
    pub progress: f32,
}

impl EntranceState {
    pub fn is_running(&self) -> bool {
        self.animation != Animation::None && self.progress < 1.0
    }
}

/// One text as it should be painted this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub id: String,
    pub text: String,
    /// Center of the text in video space.
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32,
    pub opacity: f32,
    pub style: TextStyle,
    pub visual: VisualFlags,
    pub interaction: InteractionFlags,
    pub entrance: EntranceState,
}

impl Drawable {
    fn resolve(text: &TextOverlay, elapsed_ms: f64) -> Self {
        let duration = entrance_duration_ms(text.animation);
        let progress = if duration > 0.0 {
            (elapsed_ms / duration).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        let base = &text.transform;
        let mut drawable = Self {
            id: text.id.clone(),
            text: text.text.clone(),
            left: text.position.left,
            top: text.position.top,
            scale_x: base.scale_x,
            scale_y: base.scale_y,
            angle: base.angle,
            opacity: base.opacity,
            style: text.style.clone(),
            visual: text.visual.clone(),
            interaction: text.interaction,
            entrance: EntranceState {
                animation: text.animation,
                progress,
            },
        };
        match text.animation {
            Animation::None => {}
            Animation::FadeIn => {
                drawable.opacity = base.opacity * ease_in_out_quad(progress);
            }
            Animation::SlideUp => {
                let eased = ease_out_back(progress);
                drawable.top = text.position.top + SLIDE_DISTANCE_PX * (1.0 - eased);
                drawable.opacity = (base.opacity * eased).clamp(0.0, base.opacity);
            }
            Animation::ScaleIn => {
                let eased = ease_out_back(progress);
                drawable.scale_x = base.scale_x * eased;
                drawable.scale_y = base.scale_y * eased;
            }
            Animation::BounceIn => {
                let eased = ease_out_bounce(progress);
                drawable.scale_x = base.scale_x * eased;
                drawable.scale_y = base.scale_y * eased;
            }
        }
        drawable
    }

    /// Approximate unrotated bounding box `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let chars = self.text.chars().count().max(1) as f32;
        let half_w = chars * self.style.font_size * 0.55 * self.scale_x.abs() / 2.0;
        let half_h = self.style.font_size * 1.2 * self.scale_y.abs() / 2.0;
        (
            self.left - half_w,
            self.top - half_h,
            self.left + half_w,
            self.top + half_h,
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)
    }

    /// Outline color and width in video pixels, scaled with the text.
    pub fn outline(&self) -> Option<([u8; 3], f32)> {
        let color = parse_hex_color(self.visual.stroke.as_deref()?)?;
        let width = self.visual.stroke_width * self.scale_y.abs();
        (width > 0.0).then_some((color, width))
    }
}

/// Edit made directly on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Manipulation {
    Move { left: f32, top: f32 },
    Scale { scale_x: f32, scale_y: f32 },
    Rotate { angle: f32 },
    EditText(String),
    /// Outline width in video pixels; zero removes the outline.
    Outline { width: f32 },
}

const OUTLINE_COLOR: &str = "#000000";

/// Translates a canvas edit into a store patch. `None` when the text's
/// interaction flags forbid it.
pub fn manipulation_patch(text: &TextOverlay, manipulation: &Manipulation, grid: f32) -> Option<TextPatch> {
    let patch = match manipulation {
        Manipulation::Move { left, top } => {
            if !text.interaction.moveable {
                return None;
            }
            TextPatch::position(snap_to_grid(*left, grid), snap_to_grid(*top, grid))
        }
        Manipulation::Scale { scale_x, scale_y } => {
            if !text.interaction.resizable {
                return None;
            }
            let scale = uniform_scale(*scale_x, *scale_y);
            TextPatch {
                scale_x: Some(scale),
                scale_y: Some(scale),
                ..Default::default()
            }
        }
        Manipulation::Rotate { angle } => {
            if !text.interaction.resizable {
                return None;
            }
            TextPatch {
                angle: Some(angle.rem_euclid(360.0)),
                ..Default::default()
            }
        }
        Manipulation::EditText(value) => TextPatch {
            text: Some(value.clone()),
            ..Default::default()
        },
        Manipulation::Outline { width } => {
            let width = width.max(0.0);
            let stroke = (width > 0.0).then(|| {
                text.visual
                    .stroke
                    .clone()
                    .unwrap_or_else(|| OUTLINE_COLOR.to_string())
            });
            TextPatch {
                visual: Some(VisualFlags {
                    stroke,
                    stroke_width: width,
                    ..text.visual.clone()
                }),
                ..Default::default()
            }
        }
    };
    Some(patch)
}

pub struct SceneModel {
    store: TextStore,
    clock: Box<dyn Clock>,
    grid: f32,
    duplicate_offset: f32,
    last_now: f64,
    drawables: Vec<Drawable>,
    /// Clock time at which each active text became active.
    entered_at: HashMap<String, f64>,
    selected: Option<String>,
}

impl SceneModel {
    pub fn new(store: TextStore, clock: Box<dyn Clock>, config: &EditorConfig) -> Self {
        Self {
            store,
            clock,
            grid: config.canvas_grid_px,
            duplicate_offset: config.duplicate_offset_px,
            last_now: 0.0,
            drawables: Vec::new(),
            entered_at: HashMap::new(),
            selected: None,
        }
    }

    /// Drawables in stacking order, bottom first.
    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_drawable(&self) -> Option<&Drawable> {
        let id = self.selected.as_deref()?;
        self.drawables.iter().find(|d| d.id == id)
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id.filter(|id| {
            self.drawables
                .iter()
                .any(|d| &d.id == id && d.interaction.selectable)
        });
    }

    pub fn is_animating(&self) -> bool {
        self.drawables.iter().any(|d| d.entrance.is_running())
    }

    /// Topmost selectable text under the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&str> {
        self.drawables
            .iter()
            .rev()
            .find(|d| d.interaction.selectable && d.contains(x, y))
            .map(|d| d.id.as_str())
    }

    /// Rebuilds the drawables for `now`. Entrance animations start on the
    /// inactive to active edge only.
    pub fn rebuild(&mut self, now: f64) {
        self.last_now = now;
        let clock_now = self.clock.now_ms();
        let store = self.store.read();
        let mut entered_at = HashMap::new();
        self.drawables = store
            .active_at(now)
            .map(|text| {
                let entered = self.entered_at.get(&text.id).copied().unwrap_or(clock_now);
                entered_at.insert(text.id.clone(), entered);
                Drawable::resolve(text, clock_now - entered)
            })
            .collect();
        drop(store);
        self.entered_at = entered_at;
        let still_drawn = self
            .selected
            .as_ref()
            .is_none_or(|id| self.drawables.iter().any(|d| &d.id == id));
        if !still_drawn {
            self.selected = None;
        }
    }

    /// Writes a canvas edit of the selected text back to the store.
    pub fn manipulate(&mut self, manipulation: &Manipulation) -> bool {
        let Some(id) = self.selected.clone() else {
            return false;
        };
        let written = {
            let mut store = self.store.write();
            let patch = store
                .get(&id)
                .and_then(|t| manipulation_patch(t, manipulation, self.grid));
            match patch {
                Some(patch) => store.update(&id, &patch),
                None => false,
            }
        };
        if written {
            self.rebuild(self.last_now);
        }
        written
    }

    /// Applies a keyboard command to the selected text.
    pub fn handle_command(&mut self, command: CanvasCommand) -> bool {
        let Some(id) = self.selected.clone() else {
            return false;
        };
        let changed = match command {
            CanvasCommand::Nudge { dx, dy } => {
                let mut store = self.store.write();
                let position = store.get(&id).filter(|t| t.interaction.moveable).map(|t| t.position);
                match position {
                    Some(position) => {
                        let Position { left, top } = nudged(position, dx, dy);
                        store.update(&id, &TextPatch::position(left, top))
                    }
                    None => false,
                }
            }
            CanvasCommand::Delete => {
                let removed = self.store.remove(&id);
                if removed {
                    self.selected = None;
                }
                removed
            }
            CanvasCommand::Duplicate => {
                let offset = self.duplicate_offset;
                let copy = self.store.write().duplicate_with(&id, |t| offset_copy(t, offset));
                match copy {
                    Some(copy_id) => {
                        self.rebuild(self.last_now);
                        self.select(Some(copy_id));
                        return true;
                    }
                    None => false,
                }
            }
        };
        if changed {
            self.rebuild(self.last_now);
        }
        changed
    }
}

impl TimeView for SceneModel {
    fn on_time_update(&mut self, update: &TimeUpdate) {
        self.rebuild(update.now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<f64>>);

    impl ManualClock {
        fn advance(&self, ms: f64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }

    fn scene_with(texts: Vec<TextOverlay>) -> (SceneModel, TextStore, ManualClock) {
        let store = TextStore::from_items(texts);
        let clock = ManualClock::default();
        let scene = SceneModel::new(store.clone(), Box::new(clock.clone()), &EditorConfig::default());
        (scene, store, clock)
    }

    fn text(start: f64, end: f64, animation: Animation) -> TextOverlay {
        let mut text = TextOverlay::new("Hello", start, end, Position { left: 427.0, top: 240.0 });
        text.animation = animation;
        text
    }

    #[test]
    fn test_easing_endpoints() {
        let eases: [fn(f32) -> f32; 3] = [ease_in_out_quad, ease_out_back, ease_out_bounce];
        for ease in eases {
            assert!(ease(0.0).abs() < 1e-6);
            assert!((ease(1.0) - 1.0).abs() < 1e-6);
        }
        assert!(ease_out_back(0.7) > 1.0);
    }

    #[test]
    fn test_outline_follows_stroke_and_scale() {
        let mut stroked = text(0.0, 5.0, Animation::None);
        stroked.visual.stroke = Some("#000000".into());
        stroked.visual.stroke_width = 2.0;
        stroked.transform.scale_y = 1.5;
        let mut bad_color = text(0.0, 5.0, Animation::None);
        bad_color.visual.stroke = Some("black".into());
        bad_color.visual.stroke_width = 2.0;
        let (mut scene, _, _) = scene_with(vec![stroked, bad_color, text(0.0, 5.0, Animation::None)]);
        scene.rebuild(1.0);
        let outlines: Vec<_> = scene.drawables().iter().map(Drawable::outline).collect();
        assert_eq!(outlines, [Some(([0, 0, 0], 3.0)), None, None]);
    }

    #[test]
    fn test_outline_manipulation_writes_stroke() {
        let (mut scene, store, _) = scene_with(vec![text(0.0, 5.0, Animation::None)]);
        scene.rebuild(1.0);
        let id = scene.drawables()[0].id.clone();
        scene.select(Some(id.clone()));
        assert!(scene.manipulate(&Manipulation::Outline { width: 2.0 }));
        let visual = store.get(&id).unwrap().visual;
        assert_eq!(visual.stroke.as_deref(), Some("#000000"));
        assert_eq!(visual.stroke_width, 2.0);
        assert!(scene.manipulate(&Manipulation::Outline { width: 0.0 }));
        assert_eq!(store.get(&id).unwrap().visual.stroke, None);
    }

    #[test]
    fn test_closed_interval_all_active_drawn_in_order() {
        // Texts stay visible at their end time, unlike subtitles.
        let (mut scene, _, _) = scene_with(vec![text(0.0, 5.0, Animation::None), text(2.0, 8.0, Animation::None)]);
        scene.rebuild(5.0);
        assert_eq!(scene.drawables().len(), 2);
        scene.rebuild(8.0);
        assert_eq!(scene.drawables().len(), 1);
        scene.rebuild(8.01);
        assert!(scene.drawables().is_empty());
    }

    #[test]
    fn test_fade_in_runs_on_rising_edge_only() {
        let (mut scene, _, clock) = scene_with(vec![text(1.0, 10.0, Animation::FadeIn)]);
        scene.rebuild(0.5);
        assert!(scene.drawables().is_empty());

        scene.rebuild(1.0);
        assert_eq!(scene.drawables()[0].opacity, 0.0);
        assert!(scene.is_animating());

        clock.advance(250.0);
        scene.rebuild(1.25);
        assert!((scene.drawables()[0].opacity - 0.5).abs() < 1e-6);

        clock.advance(250.0);
        scene.rebuild(1.5);
        assert_eq!(scene.drawables()[0].opacity, 1.0);
        assert!(!scene.is_animating());

        // Staying active does not restart it.
        clock.advance(1000.0);
        scene.rebuild(2.5);
        assert_eq!(scene.drawables()[0].entrance.progress, 1.0);

        // Leaving and re-entering does.
        scene.rebuild(11.0);
        scene.rebuild(3.0);
        assert_eq!(scene.drawables()[0].opacity, 0.0);
    }

    #[test]
    fn test_slide_up_and_scale_in_start_offset() {
        let (mut scene, _, clock) = scene_with(vec![
            text(0.0, 5.0, Animation::SlideUp),
            text(0.0, 5.0, Animation::ScaleIn),
            text(0.0, 5.0, Animation::BounceIn),
        ]);
        scene.rebuild(0.0);
        let slide = &scene.drawables()[0];
        assert_eq!(slide.top, 240.0 + SLIDE_DISTANCE_PX);
        assert_eq!(slide.opacity, 0.0);
        assert_eq!(scene.drawables()[1].scale_x, 0.0);
        assert_eq!(scene.drawables()[2].scale_y, 0.0);

        clock.advance(400.0);
        scene.rebuild(0.4);
        assert!((scene.drawables()[1].scale_x - 1.0).abs() < 1e-6);
        assert!(scene.drawables()[0].entrance.is_running());

        clock.advance(100.0);
        scene.rebuild(0.5);
        assert_eq!(scene.drawables()[0].top, 240.0);
        assert!((scene.drawables()[2].scale_x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_move_snaps_and_writes_back() {
        let (mut scene, store, _) = scene_with(vec![text(0.0, 5.0, Animation::None)]);
        scene.rebuild(1.0);
        let id = scene.drawables()[0].id.clone();
        scene.select(Some(id.clone()));
        assert!(scene.manipulate(&Manipulation::Move { left: 433.0, top: 247.0 }));
        assert_eq!(store.get(&id).unwrap().position, Position { left: 430.0, top: 250.0 });
        assert_eq!(scene.drawables()[0].left, 430.0);
    }

    #[test]
    fn test_scale_is_uniform_and_flags_are_respected() {
        let mut locked = text(0.0, 5.0, Animation::None);
        locked.interaction.moveable = false;
        let (mut scene, store, _) = scene_with(vec![locked]);
        scene.rebuild(1.0);
        let id = scene.drawables()[0].id.clone();
        scene.select(Some(id.clone()));

        assert!(!scene.manipulate(&Manipulation::Move { left: 0.0, top: 0.0 }));
        assert!(scene.manipulate(&Manipulation::Scale { scale_x: 1.5, scale_y: 2.0 }));
        let stored = store.get(&id).unwrap();
        assert_eq!(stored.transform.scale_x, 2.0);
        assert_eq!(stored.transform.scale_y, 2.0);
        assert_eq!(stored.position, Position { left: 427.0, top: 240.0 });
    }

    #[test]
    fn test_keyboard_commands() {
        let (mut scene, store, _) = scene_with(vec![text(0.0, 5.0, Animation::None)]);
        scene.rebuild(1.0);
        let id = scene.drawables()[0].id.clone();

        assert!(!scene.handle_command(CanvasCommand::Delete));
        scene.select(Some(id.clone()));

        assert!(scene.handle_command(CanvasCommand::Nudge { dx: -10.0, dy: 1.0 }));
        assert_eq!(store.get(&id).unwrap().position, Position { left: 417.0, top: 241.0 });

        assert!(scene.handle_command(CanvasCommand::Duplicate));
        let copy_id = scene.selected().unwrap().to_string();
        assert_ne!(copy_id, id);
        assert_eq!(store.get(&copy_id).unwrap().position, Position { left: 437.0, top: 261.0 });
        assert_eq!(scene.drawables().len(), 2);

        assert!(scene.handle_command(CanvasCommand::Delete));
        assert!(store.get(&copy_id).is_none());
        assert!(scene.selected().is_none());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_duplicate_uses_configured_offset() {
        let store = TextStore::from_items(vec![text(0.0, 5.0, Animation::None)]);
        let config = EditorConfig {
            duplicate_offset_px: 35.0,
            ..EditorConfig::default()
        };
        let mut scene = SceneModel::new(store.clone(), Box::new(ManualClock::default()), &config);
        scene.rebuild(1.0);
        scene.select(Some(scene.drawables()[0].id.clone()));
        assert!(scene.handle_command(CanvasCommand::Duplicate));
        let copy = store.get(scene.selected().unwrap()).unwrap();
        assert_eq!(copy.position, Position { left: 462.0, top: 275.0 });
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let (mut scene, _, _) = scene_with(vec![text(0.0, 5.0, Animation::None), text(0.0, 5.0, Animation::None)]);
        scene.rebuild(1.0);
        let top_id = scene.drawables()[1].id.clone();
        assert_eq!(scene.hit_test(427.0, 240.0), Some(top_id.as_str()));
        assert_eq!(scene.hit_test(0.0, 0.0), None);
    }

    #[test]
    fn test_selection_dropped_when_text_leaves_window() {
        let (mut scene, _, _) = scene_with(vec![text(0.0, 5.0, Animation::None)]);
        scene.rebuild(1.0);
        let id = scene.drawables()[0].id.clone();
        scene.select(Some(id));
        scene.rebuild(6.0);
        assert!(scene.selected().is_none());
    }
}
