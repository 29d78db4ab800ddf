use eframe::egui::{self, StrokeKind};

use crate::config::EditorConfig;
use crate::interaction::keyboard::{Key, Modifiers, command_for};
use crate::renderer::overlay_renderer::{SubtitleFrame, parse_hex_color};
use crate::renderer::scene::{Drawable, Manipulation, SceneModel};
use crate::renderer::waveform::{PeakWaveform, WaveformEvent};
use crate::types::overlay::Align;
use crate::types::playback_state::PlaybackState;
use crate::types::time::format_clock;

const WAVEFORM_HEIGHT: f32 = 48.0;

/// What the player panel asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    TogglePlay,
    Waveform(WaveformEvent),
}

/// Preview of the video canvas with the subtitle line and the free texts
/// painted over it, plus the waveform strip.
pub struct VideoPlayer {
    video_size: egui::Vec2,
    /// Pointer (video space) and text position at the start of a canvas drag.
    drag_origin: Option<(egui::Pos2, egui::Pos2)>,
    text_buffer: String,
    buffer_for: Option<String>,
}

fn color_from_hex(hex: &str) -> egui::Color32 {
    parse_hex_color(hex)
        .map(|[r, g, b]| egui::Color32::from_rgb(r, g, b))
        .unwrap_or(egui::Color32::WHITE)
}

impl VideoPlayer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            video_size: egui::vec2(config.video_width, config.video_height),
            drag_origin: None,
            text_buffer: String::new(),
            buffer_for: None,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        playback: PlaybackState,
        subtitle: Option<&SubtitleFrame>,
        scene: &mut SceneModel,
        waveform: &PeakWaveform,
        config: &EditorConfig,
    ) -> Vec<PlayerEvent> {
        let mut events = Vec::new();

        let available = ui.available_width().max(160.0);
        let ratio = self.video_size.y / self.video_size.x;
        let canvas_size = egui::vec2(available, available * ratio).min(egui::vec2(available, 420.0));
        let canvas_size = egui::vec2(canvas_size.y / ratio, canvas_size.y);
        let (canvas, response) = ui.allocate_exact_size(canvas_size, egui::Sense::click_and_drag());
        let scale = canvas.width() / self.video_size.x;
        let painter = ui.painter_at(canvas);

        painter.rect_filled(canvas, 0.0, egui::Color32::BLACK);
        painter.text(
            canvas.left_top() + egui::vec2(8.0, 8.0),
            egui::Align2::LEFT_TOP,
            format!(
                "{} / {}",
                format_clock(playback.playhead),
                playback.duration.map(format_clock).unwrap_or_else(|| "-:--.-".to_string())
            ),
            egui::FontId::monospace(12.0),
            egui::Color32::from_gray(180),
        );

        for drawable in scene.drawables() {
            Self::draw_text(&painter, canvas, scale, drawable, scene.selected() == Some(drawable.id.as_str()));
        }
        if let Some(frame) = subtitle {
            Self::draw_subtitle(&painter, canvas, scale, frame);
        }

        self.canvas_interaction(ui, &response, canvas, scale, scene);
        self.keyboard(ui, scene, config);

        ui.horizontal(|ui| {
            let label = if playback.is_playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(label).clicked() {
                events.push(PlayerEvent::TogglePlay);
            }
            ui.label(format!("{:.2}x", playback.playback_rate));
        });

        self.manipulation_bar(ui, scene);

        if let Some(event) = Self::draw_waveform(ui, waveform) {
            events.push(PlayerEvent::Waveform(event));
        }
        events
    }

    fn to_screen(canvas: egui::Rect, scale: f32, left: f32, top: f32) -> egui::Pos2 {
        canvas.min + egui::vec2(left, top) * scale
    }

    fn to_video(canvas: egui::Rect, scale: f32, pos: egui::Pos2) -> egui::Pos2 {
        ((pos - canvas.min) / scale).to_pos2()
    }

    fn draw_subtitle(painter: &egui::Painter, canvas: egui::Rect, scale: f32, frame: &SubtitleFrame) {
        let (x, anchor) = match frame.align {
            Align::Left => (canvas.left() + 16.0, egui::Align2::LEFT_BOTTOM),
            Align::Center => (canvas.center().x, egui::Align2::CENTER_BOTTOM),
            Align::Right => (canvas.right() - 16.0, egui::Align2::RIGHT_BOTTOM),
        };
        let pos = egui::pos2(x, canvas.bottom() - 24.0 * scale);
        let font = egui::FontId::proportional((frame.font_size * scale).max(8.0));
        let backdrop = painter.text(
            pos + egui::vec2(1.0, 1.0),
            anchor,
            &frame.text,
            font.clone(),
            egui::Color32::from_black_alpha(200),
        );
        painter.rect_filled(backdrop.expand(4.0), 4.0, egui::Color32::from_black_alpha(140));
        painter.text(pos, anchor, &frame.text, font, color_from_hex(&frame.color));
    }

    fn draw_text(painter: &egui::Painter, canvas: egui::Rect, scale: f32, drawable: &Drawable, selected: bool) {
        let color = color_from_hex(&drawable.style.color).gamma_multiply(drawable.opacity.clamp(0.0, 1.0));
        let size = (drawable.style.font_size * drawable.scale_y.abs() * scale).max(1.0);
        let galley = painter.layout_no_wrap(drawable.text.clone(), egui::FontId::proportional(size), color);

        // Text shapes rotate around their top-left corner; offset so the
        // rotation happens around the text center.
        let center = Self::to_screen(canvas, scale, drawable.left, drawable.top);
        let angle = drawable.angle.to_radians();
        let half = galley.size() / 2.0;
        let (sin, cos) = angle.sin_cos();
        let offset = egui::vec2(half.x * cos - half.y * sin, half.x * sin + half.y * cos);
        let pos = center - offset;

        if drawable.visual.shadow {
            let shadow = painter.layout_no_wrap(
                drawable.text.clone(),
                egui::FontId::proportional(size),
                egui::Color32::from_black_alpha((160.0 * drawable.opacity) as u8),
            );
            painter.add(egui::epaint::TextShape::new(pos + egui::vec2(2.0, 2.0), shadow, color).with_angle(angle));
        }
        if let Some(([r, g, b], width)) = drawable.outline() {
            let outline = egui::Color32::from_rgb(r, g, b).gamma_multiply(drawable.opacity.clamp(0.0, 1.0));
            let radius = width * scale;
            for step in 0..8 {
                let theta = step as f32 * std::f32::consts::FRAC_PI_4;
                let ring = painter.layout_no_wrap(drawable.text.clone(), egui::FontId::proportional(size), outline);
                let nudge = egui::vec2(theta.cos(), theta.sin()) * radius;
                painter.add(egui::epaint::TextShape::new(pos + nudge, ring, outline).with_angle(angle));
            }
        }
        painter.add(egui::epaint::TextShape::new(pos, galley, color).with_angle(angle));

        if selected {
            let (min_x, min_y, max_x, max_y) = drawable.bounds();
            let rect = egui::Rect::from_min_max(
                Self::to_screen(canvas, scale, min_x, min_y),
                Self::to_screen(canvas, scale, max_x, max_y),
            );
            painter.rect_stroke(
                rect,
                2.0,
                egui::Stroke::new(1.5, egui::Color32::from_rgb(80, 160, 255)),
                StrokeKind::Outside,
            );
        }
    }

    fn canvas_interaction(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        canvas: egui::Rect,
        scale: f32,
        scene: &mut SceneModel,
    ) {
        if response.clicked() || response.drag_started() {
            let pointer = ui.input(|i| i.pointer.press_origin()).or(response.interact_pointer_pos());
            if let Some(pos) = pointer {
                let video = Self::to_video(canvas, scale, pos);
                let hit = scene.hit_test(video.x, video.y).map(str::to_string);
                scene.select(hit);
                self.drag_origin = scene
                    .selected_drawable()
                    .filter(|_| response.drag_started())
                    .map(|d| (video, egui::pos2(d.left, d.top)));
            }
        }

        if response.dragged() {
            if let (Some((start, origin)), Some(pos)) = (self.drag_origin, response.interact_pointer_pos()) {
                let delta = Self::to_video(canvas, scale, pos) - start;
                scene.manipulate(&Manipulation::Move {
                    left: origin.x + delta.x,
                    top: origin.y + delta.y,
                });
            }
        }
        if response.drag_stopped() {
            self.drag_origin = None;
        }

        // Scroll over the selected text scales it.
        if response.hovered() && scene.selected().is_some() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(d) = scene.selected_drawable() {
                    let factor = (1.0 + scroll * 0.002).max(0.1);
                    let scale = Manipulation::Scale {
                        scale_x: d.scale_x * factor,
                        scale_y: d.scale_y * factor,
                    };
                    scene.manipulate(&scale);
                }
            }
        }
    }

    fn keyboard(&self, ui: &egui::Ui, scene: &mut SceneModel, config: &EditorConfig) {
        if scene.selected().is_none() || ui.ctx().wants_keyboard_input() {
            return;
        }
        const KEYS: [(egui::Key, Key); 7] = [
            (egui::Key::ArrowLeft, Key::ArrowLeft),
            (egui::Key::ArrowRight, Key::ArrowRight),
            (egui::Key::ArrowUp, Key::ArrowUp),
            (egui::Key::ArrowDown, Key::ArrowDown),
            (egui::Key::Delete, Key::Delete),
            (egui::Key::Backspace, Key::Backspace),
            (egui::Key::D, Key::D),
        ];
        let pressed: Vec<(Key, Modifiers)> = ui.input(|i| {
            let modifiers = Modifiers {
                shift: i.modifiers.shift,
                command: i.modifiers.command,
            };
            KEYS.iter()
                .filter(|(egui_key, _)| i.key_pressed(*egui_key))
                .map(|(_, key)| (*key, modifiers))
                .collect()
        });
        for (key, modifiers) in pressed {
            if let Some(command) = command_for(key, modifiers, config) {
                scene.handle_command(command);
            }
        }
    }

    /// Text, scale and rotation of the selected text.
    fn manipulation_bar(&mut self, ui: &mut egui::Ui, scene: &mut SceneModel) {
        let Some(selected) = scene.selected_drawable().cloned() else {
            self.buffer_for = None;
            return;
        };
        if self.buffer_for.as_deref() != Some(selected.id.as_str()) {
            self.text_buffer = selected.text.clone();
            self.buffer_for = Some(selected.id.clone());
        }

        ui.horizontal(|ui| {
            ui.label("Text");
            if ui.text_edit_singleline(&mut self.text_buffer).changed() {
                scene.manipulate(&Manipulation::EditText(self.text_buffer.clone()));
            }

            let mut scale = selected.scale_x.max(selected.scale_y);
            if ui
                .add(egui::Slider::new(&mut scale, 0.1..=5.0).text("Scale"))
                .changed()
            {
                scene.manipulate(&Manipulation::Scale {
                    scale_x: scale,
                    scale_y: scale,
                });
            }

            let mut angle = selected.angle;
            if ui
                .add(egui::Slider::new(&mut angle, 0.0..=359.0).text("Angle"))
                .changed()
            {
                scene.manipulate(&Manipulation::Rotate { angle });
            }

            let mut outline = if selected.visual.stroke.is_some() {
                selected.visual.stroke_width
            } else {
                0.0
            };
            if ui
                .add(egui::Slider::new(&mut outline, 0.0..=8.0).text("Outline"))
                .changed()
            {
                scene.manipulate(&Manipulation::Outline { width: outline });
            }
        });
    }

    fn draw_waveform(ui: &mut egui::Ui, waveform: &PeakWaveform) -> Option<WaveformEvent> {
        let size = egui::vec2(ui.available_width().max(1.0), WAVEFORM_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, egui::Color32::from_gray(30));

        let peaks = waveform.peaks();
        let progress_x = rect.left() + rect.width() * waveform.progress() as f32;
        if !peaks.is_empty() {
            let bar = rect.width() / peaks.len() as f32;
            for (i, peak) in peaks.iter().enumerate() {
                let x = rect.left() + i as f32 * bar + bar / 2.0;
                let half = peak * rect.height() / 2.0 * 0.9;
                let color = if x <= progress_x {
                    egui::Color32::from_rgb(168, 85, 247)
                } else {
                    egui::Color32::from_gray(110)
                };
                painter.line_segment(
                    [egui::pos2(x, rect.center().y - half), egui::pos2(x, rect.center().y + half)],
                    egui::Stroke::new((bar * 0.6).max(1.0), color),
                );
            }
        }
        if waveform.duration().is_some() {
            painter.line_segment(
                [egui::pos2(progress_x, rect.top()), egui::pos2(progress_x, rect.bottom())],
                egui::Stroke::new(1.5, egui::Color32::WHITE),
            );
        }

        if response.clicked() || response.dragged() {
            let pos = response.interact_pointer_pos()?;
            return waveform.click(pos.x - rect.left(), rect.width());
        }
        None
    }
}
