use crate::types::track::{Track, TrackKind};
use eframe::egui;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackHeaderAction {
    ToggleEnabled(String),
    ToggleLocked(String),
}

pub fn track_color(kind: TrackKind) -> egui::Color32 {
    match kind {
        TrackKind::Video => egui::Color32::from_rgb(100, 180, 255),
        TrackKind::Audio => egui::Color32::from_rgb(180, 255, 100),
        TrackKind::Subtitle => egui::Color32::from_rgb(168, 85, 247),
        TrackKind::Text => egui::Color32::from_rgb(255, 180, 100),
    }
}

/// Draws the header of one lane: visibility and lock toggles plus the name.
pub fn track_header(ui: &mut egui::Ui, rect: egui::Rect, track: &Track) -> Option<TrackHeaderAction> {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::DARK_GRAY);
    painter.rect_filled(
        egui::Rect::from_min_size(rect.left_top(), egui::vec2(3.0, rect.height())),
        0.0,
        track_color(track.kind),
    );

    let mut action = None;
    let button_size = egui::vec2(22.0, 22.0);
    let top = rect.top() + (rect.height() - button_size.y) / 2.0;

    let eye = if track.enabled { "👁" } else { "—" };
    let eye_rect = egui::Rect::from_min_size(egui::pos2(rect.left() + 6.0, top), button_size);
    if ui
        .put(eye_rect, egui::Button::new(eye))
        .on_hover_text("Show / hide")
        .clicked()
    {
        action = Some(TrackHeaderAction::ToggleEnabled(track.id.clone()));
    }

    let lock = if track.locked { "🔒" } else { "🔓" };
    let lock_rect = egui::Rect::from_min_size(egui::pos2(rect.left() + 30.0, top), button_size);
    if ui
        .put(lock_rect, egui::Button::new(lock))
        .on_hover_text("Lock / unlock")
        .clicked()
    {
        action = Some(TrackHeaderAction::ToggleLocked(track.id.clone()));
    }

    let text_color = if track.enabled {
        egui::Color32::WHITE
    } else {
        egui::Color32::from_gray(120)
    };
    painter.text(
        egui::pos2(rect.left() + 58.0, rect.center().y),
        egui::Align2::LEFT_CENTER,
        &track.name,
        egui::FontId::proportional(13.0),
        text_color,
    );
    action
}
