use std::collections::BTreeMap;

use eframe::egui::{self, StrokeKind};

use crate::config::EditorConfig;
use crate::interaction::drag::BlockDrag;
use crate::interaction::pinch::PinchZoom;
use crate::interaction::scrubber::{
    BlockRect, TrackScale, block_at, block_rects, click_seek_target, ruler_ticks, scrub_target,
};
use crate::renderer::time_player_bridge::Gesture;
use crate::store::{SubtitleStore, TextStore};
use crate::types::overlay::Overlay;
use crate::types::playback_state::PlaybackState;
use crate::types::time::format_time;
use crate::types::track::{TrackKind, TrackList};
use crate::ui::track_widget::{TrackHeaderAction, track_color, track_header};

const RULER_HEIGHT: f32 = 30.0;
const TRACK_LABEL_WIDTH: f32 = 120.0;
const BLOCK_MARGIN: f32 = 6.0;

/// Timeline widget state that persists between frames
pub struct TimelineState {
    pub zoom: PinchZoom,
    pub drag: BlockDrag,
    pub selected_block: Option<String>,
    /// Active touch points by touch id.
    touches: BTreeMap<u64, egui::Pos2>,
    min_block_width: f32,
}

impl TimelineState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            zoom: PinchZoom::new(config),
            drag: BlockDrag::new(config.drag_snap_interval),
            selected_block: None,
            touches: BTreeMap::new(),
            min_block_width: config.min_block_width,
        }
    }

    fn touch_points(&self) -> Vec<(f32, f32)> {
        self.touches.values().map(|p| (p.x, p.y)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// The user moved the playhead.
    Seek { time: f64, gesture: Gesture },
    PlayToggled,
    BlockSelected(String),
}

pub struct TimelineWidget<'a> {
    state: &'a mut TimelineState,
    tracks: &'a mut TrackList,
    subtitles: &'a SubtitleStore,
    texts: &'a TextStore,
    playback: PlaybackState,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(
        state: &'a mut TimelineState,
        tracks: &'a mut TrackList,
        subtitles: &'a SubtitleStore,
        texts: &'a TextStore,
        playback: PlaybackState,
    ) -> Self {
        Self {
            state,
            tracks,
            subtitles,
            texts,
            playback,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> Vec<TimelineEvent> {
        let mut events = Vec::new();

        self.toolbar(ui, &mut events);
        ui.add_space(4.0);
        self.handle_pinch(ui);

        let total_height = RULER_HEIGHT + self.tracks.total_height();
        ui.horizontal_top(|ui| {
            let (header_rect, _) =
                ui.allocate_exact_size(egui::vec2(TRACK_LABEL_WIDTH, total_height), egui::Sense::hover());
            self.draw_headers(ui, header_rect);

            // Zoom stretches the strip; the scroll area pans it.
            let strip_width = ui.available_width().max(1.0) * self.state.zoom.zoom();
            egui::ScrollArea::horizontal()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let (strip_rect, _) =
                        ui.allocate_exact_size(egui::vec2(strip_width, total_height), egui::Sense::hover());
                    self.draw_strip(ui, strip_rect, &mut events);
                });
        });
        events
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, events: &mut Vec<TimelineEvent>) {
        ui.horizontal(|ui| {
            ui.menu_button("+ Add Track", |ui| {
                for kind in TrackKind::ALL {
                    if ui.button(kind.label()).clicked() {
                        let name = self.tracks.add_track(kind).name.clone();
                        log::debug!("added track {}", name);
                        ui.close_menu();
                    }
                }
            });
            ui.separator();
            if ui.button("⏮").clicked() {
                events.push(TimelineEvent::Seek {
                    time: 0.0,
                    gesture: Gesture::Click,
                });
            }
            let play_label = if self.playback.is_playing { "⏸" } else { "▶" };
            if ui.button(play_label).clicked() {
                events.push(TimelineEvent::PlayToggled);
            }
            let duration = self
                .playback
                .duration
                .map(format_time)
                .unwrap_or_else(|| "--:--".to_string());
            ui.label(format!("Time: {} / {}", format_time(self.playback.playhead), duration));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("+").on_hover_text("Zoom in").clicked() {
                    self.state.zoom.zoom_in();
                }
                ui.label(format!("{:.0}%", self.state.zoom.zoom() * 100.0));
                if ui.button("−").on_hover_text("Zoom out").clicked() {
                    self.state.zoom.zoom_out();
                }
            });
        });
    }

    /// Two-finger pinch from raw touches; trackpad pinch and ctrl+scroll
    /// arrive as a zoom factor instead.
    fn handle_pinch(&mut self, ui: &egui::Ui) {
        let (touches, zoom_delta) = ui.input(|i| {
            let touches: Vec<(u64, egui::TouchPhase, egui::Pos2)> = i
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Touch { id, phase, pos, .. } => Some((id.0, *phase, *pos)),
                    _ => None,
                })
                .collect();
            (touches, i.zoom_delta())
        });

        for (id, phase, pos) in touches {
            match phase {
                egui::TouchPhase::Start => {
                    self.state.touches.insert(id, pos);
                    let points = self.state.touch_points();
                    self.state.zoom.touch_start(&points);
                }
                egui::TouchPhase::Move => {
                    self.state.touches.insert(id, pos);
                    let points = self.state.touch_points();
                    self.state.zoom.touch_move(&points);
                }
                egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                    self.state.touches.remove(&id);
                    self.state.zoom.touch_end();
                }
            }
        }

        if self.state.touches.is_empty() && zoom_delta != 1.0 {
            self.state.zoom.apply_factor(zoom_delta);
        }
    }

    fn draw_headers(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let corner = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), RULER_HEIGHT));
        ui.painter().rect_filled(corner, 0.0, egui::Color32::from_gray(40));

        let mut actions = Vec::new();
        let mut y = rect.top() + RULER_HEIGHT;
        for track in &self.tracks.tracks {
            let row = egui::Rect::from_min_size(egui::pos2(rect.left(), y), egui::vec2(rect.width(), track.height));
            actions.extend(track_header(ui, row, track));
            y += track.height;
        }
        for action in actions {
            match action {
                TrackHeaderAction::ToggleEnabled(id) => self.tracks.toggle_enabled(&id),
                TrackHeaderAction::ToggleLocked(id) => self.tracks.toggle_locked(&id),
            }
        }
    }

    fn draw_strip(&mut self, ui: &mut egui::Ui, strip: egui::Rect, events: &mut Vec<TimelineEvent>) {
        let painter = ui.painter_at(strip);
        painter.rect_filled(strip, 0.0, ui.style().visuals.window_fill);

        // No mapping until the duration is known.
        let scale = TrackScale::new(strip.width(), self.playback.duration);

        let ruler_rect = egui::Rect::from_min_size(strip.min, egui::vec2(strip.width(), RULER_HEIGHT));
        self.draw_ruler(&painter, ruler_rect, scale.as_ref());
        let ruler_response = ui.allocate_rect(ruler_rect, egui::Sense::click_and_drag());
        self.scrub(&ruler_response, ruler_rect, events);

        let subtitle_lane = self.tracks.first_of(TrackKind::Subtitle).map(|t| t.id.clone());
        let text_lane = self.tracks.first_of(TrackKind::Text).map(|t| t.id.clone());
        let lanes: Vec<_> = self
            .tracks
            .tracks
            .iter()
            .map(|t| (t.id.clone(), t.kind, t.enabled, t.locked, t.height))
            .collect();

        let lane_fill = ui.style().visuals.widgets.noninteractive.bg_fill;
        let lane_line = ui.style().visuals.widgets.noninteractive.bg_stroke.color;
        let mut y = ruler_rect.bottom();
        for (id, kind, enabled, locked, height) in lanes {
            let lane = egui::Rect::from_min_size(egui::pos2(strip.left(), y), egui::vec2(strip.width(), height));
            y += height;
            painter.rect_filled(lane, 0.0, lane_fill);
            painter.line_segment(
                [lane.left_bottom(), lane.right_bottom()],
                egui::Stroke::new(1.0, lane_line),
            );

            let response = ui.allocate_rect(lane, egui::Sense::click_and_drag());
            if subtitle_lane.as_deref() == Some(id.as_str()) {
                self.subtitle_lane(&painter, lane, scale.as_ref(), &response, locked, events);
            } else if text_lane.as_deref() == Some(id.as_str()) {
                self.text_lane(&painter, lane, scale.as_ref(), &response, events);
            } else if matches!(kind, TrackKind::Video | TrackKind::Audio) {
                self.scrub(&response, lane, events);
            }

            if !enabled {
                painter.rect_filled(lane, 0.0, egui::Color32::from_black_alpha(110));
            }
        }

        self.continue_drag(ui, strip, scale.as_ref());
        self.draw_playhead(&painter, strip, scale.as_ref());
    }

    fn draw_ruler(&self, painter: &egui::Painter, ruler_rect: egui::Rect, scale: Option<&TrackScale>) {
        painter.rect_filled(ruler_rect, 0.0, egui::Color32::from_gray(40));

        let Some(scale) = scale else {
            painter.text(
                ruler_rect.left_center() + egui::vec2(6.0, 0.0),
                egui::Align2::LEFT_CENTER,
                "Waiting for media…",
                egui::FontId::proportional(11.0),
                egui::Color32::from_gray(160),
            );
            return;
        };

        for tick in ruler_ticks(scale) {
            let x = ruler_rect.left() + tick.x;
            if tick.major {
                painter.line_segment(
                    [
                        egui::pos2(x, ruler_rect.bottom() - 15.0),
                        egui::pos2(x, ruler_rect.bottom()),
                    ],
                    egui::Stroke::new(2.0, egui::Color32::WHITE),
                );
                painter.text(
                    egui::pos2(x + 2.0, ruler_rect.center().y),
                    egui::Align2::LEFT_CENTER,
                    format!("{:.1}s", tick.time),
                    egui::FontId::proportional(11.0),
                    egui::Color32::WHITE,
                );
            } else {
                painter.line_segment(
                    [
                        egui::pos2(x, ruler_rect.bottom() - 5.0),
                        egui::pos2(x, ruler_rect.bottom()),
                    ],
                    egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
                );
            }
        }
    }

    /// Pointer down and move on a lane seek continuously.
    fn scrub(&self, response: &egui::Response, rect: egui::Rect, events: &mut Vec<TimelineEvent>) {
        if !response.is_pointer_button_down_on() && !response.clicked() {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let gesture = if response.dragged() {
            Gesture::PointerMove
        } else {
            Gesture::PointerDown
        };
        if let Some(time) = scrub_target(pos.x - rect.left(), rect.width(), self.playback.duration) {
            events.push(TimelineEvent::Seek { time, gesture });
        }
    }

    fn block_rect(lane: egui::Rect, block: &BlockRect) -> egui::Rect {
        egui::Rect::from_min_size(
            egui::pos2(lane.left() + block.x, lane.top() + BLOCK_MARGIN),
            egui::vec2(block.width, lane.height() - 2.0 * BLOCK_MARGIN),
        )
    }

    fn draw_block(painter: &egui::Painter, rect: egui::Rect, label: &str, color: egui::Color32, selected: bool) {
        let fill = if selected {
            egui::Color32::from_rgb(255, 180, 100)
        } else {
            color
        };
        painter.rect_filled(rect, 4.0, fill);
        let border = if selected {
            egui::Color32::WHITE
        } else {
            egui::Color32::from_black_alpha(50)
        };
        painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, border), StrokeKind::Inside);
        if rect.width() > 40.0 {
            painter.with_clip_rect(rect.intersect(painter.clip_rect())).text(
                rect.left_center() + egui::vec2(4.0, 0.0),
                egui::Align2::LEFT_CENTER,
                label,
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }
    }

    fn subtitle_lane(
        &mut self,
        painter: &egui::Painter,
        lane: egui::Rect,
        scale: Option<&TrackScale>,
        response: &egui::Response,
        locked: bool,
        events: &mut Vec<TimelineEvent>,
    ) {
        let Some(scale) = scale else {
            return;
        };
        let items = self.subtitles.snapshot();
        let rects = block_rects(&items, scale, self.state.min_block_width);
        for (item, block) in items.iter().zip(&rects) {
            let selected = self.state.selected_block.as_deref() == Some(item.id())
                || self.state.drag.dragged_id() == Some(item.id());
            Self::draw_block(
                painter,
                Self::block_rect(lane, block),
                &item.text,
                track_color(TrackKind::Subtitle),
                selected,
            );
        }

        if response.drag_started() {
            let origin = response.ctx.input(|i| i.pointer.press_origin());
            if let Some(origin) = origin {
                let x = origin.x - lane.left();
                if let Some(block) = block_at(&rects, x) {
                    let id = block.id.clone();
                    if self.state.drag.pointer_down(self.subtitles, &id, x, locked) {
                        self.state.selected_block = Some(id.clone());
                        events.push(TimelineEvent::BlockSelected(id));
                    }
                }
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let x = pos.x - lane.left();
                let hit = block_at(&rects, x).map(|block| block.id.clone());
                if let Some(time) = click_seek_target(Some(scale), x, hit.is_some(), self.state.drag.is_dragging()) {
                    events.push(TimelineEvent::Seek {
                        time,
                        gesture: Gesture::Click,
                    });
                }
                if let Some(id) = hit {
                    self.state.selected_block = Some(id.clone());
                    events.push(TimelineEvent::BlockSelected(id));
                }
            }
        }
    }

    fn text_lane(
        &self,
        painter: &egui::Painter,
        lane: egui::Rect,
        scale: Option<&TrackScale>,
        response: &egui::Response,
        events: &mut Vec<TimelineEvent>,
    ) {
        let Some(scale) = scale else {
            return;
        };
        let items = self.texts.snapshot();
        let rects = block_rects(&items, scale, self.state.min_block_width);
        for (item, block) in items.iter().zip(&rects) {
            Self::draw_block(
                painter,
                Self::block_rect(lane, block),
                &item.text,
                track_color(TrackKind::Text),
                false,
            );
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let x = pos.x - lane.left();
                let on_block = block_at(&rects, x).is_some();
                if let Some(time) = click_seek_target(Some(scale), x, on_block, false) {
                    events.push(TimelineEvent::Seek {
                        time,
                        gesture: Gesture::Click,
                    });
                }
            }
        }
    }

    /// Move and release are read from the global pointer so a fast drag that
    /// leaves the block (or the strip) keeps tracking.
    fn continue_drag(&mut self, ui: &egui::Ui, strip: egui::Rect, scale: Option<&TrackScale>) {
        if !self.state.drag.is_dragging() {
            return;
        }
        let (pos, released) = ui.input(|i| (i.pointer.latest_pos(), !i.pointer.any_down()));
        if let Some(pos) = pos {
            self.state.drag.pointer_move(pos.x - strip.left(), scale, self.subtitles);
        }
        if released {
            self.state.drag.pointer_up();
        }
    }

    fn draw_playhead(&self, painter: &egui::Painter, strip: egui::Rect, scale: Option<&TrackScale>) {
        let Some(scale) = scale else {
            return;
        };
        let x = strip.left() + scale.playhead_x(self.playback.playhead);

        painter.line_segment(
            [egui::pos2(x, strip.top()), egui::pos2(x, strip.bottom())],
            egui::Stroke::new(2.0, egui::Color32::RED),
        );
        let handle_rect = egui::Rect::from_center_size(egui::pos2(x, strip.top() + 15.0), egui::vec2(12.0, 12.0));
        painter.rect_filled(handle_rect, 6.0, egui::Color32::RED);
    }
}
