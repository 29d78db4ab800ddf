use crate::renderer::time_player_bridge::{TimeUpdate, TimeView};
use crate::store::{OverlayStore, SubtitleStore};
use crate::types::overlay::Align;
use crate::types::subtitle::Subtitle;

/// The subtitle line the player shows for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleFrame {
    pub id: String,
    pub text: String,
    pub font_size: f32,
    pub color: String,
    pub align: Align,
}

impl From<&Subtitle> for SubtitleFrame {
    fn from(sub: &Subtitle) -> Self {
        Self {
            id: sub.id.clone(),
            text: sub.text.clone(),
            font_size: sub.font_size,
            color: sub.color.clone(),
            align: sub.align,
        }
    }
}

/// At most one subtitle is shown: the first active one in insertion order.
pub fn subtitle_frame_at(store: &OverlayStore<Subtitle>, now: f64) -> Option<SubtitleFrame> {
    store.first_active_at(now).map(SubtitleFrame::from)
}

/// Follows the playhead and keeps the current subtitle frame.
pub struct SubtitleOverlayView {
    store: SubtitleStore,
    current: Option<SubtitleFrame>,
}

impl SubtitleOverlayView {
    pub fn new(store: SubtitleStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&SubtitleFrame> {
        self.current.as_ref()
    }
}

impl TimeView for SubtitleOverlayView {
    fn on_time_update(&mut self, update: &TimeUpdate) {
        self.current = subtitle_frame_at(&self.store.read(), update.now);
    }
}

/// Parses `#rgb` / `#rrggbb` into RGB components.
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    match hex.len() {
        3 => Some([digit(0)? * 17, digit(1)? * 17, digit(2)? * 17]),
        6 => {
            let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            Some([byte(0)?, byte(2)?, byte(4)?])
        }
        _ => None,
    }
}
