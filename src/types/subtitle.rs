use serde::{Deserialize, Serialize};

use crate::types::overlay::{Align, Overlay};

pub const DEFAULT_SUBTITLE_TEXT: &str = "New subtitle";
pub const DEFAULT_FONT_SIZE: f32 = 24.0;
pub const DEFAULT_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub font_size: f32,
    pub color: String,
    pub align: Align,
}

impl Subtitle {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            start,
            end,
            text: text.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_COLOR.to_string(),
            align: Align::Center,
        }
    }

    /// A fresh subtitle appended after `last_end` with the given span.
    pub fn appended_after(last_end: f64, span: f64) -> Self {
        Self::new(last_end, last_end + span, DEFAULT_SUBTITLE_TEXT)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitlePatch {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
    pub align: Option<Align>,
}

impl SubtitlePatch {
    pub fn window(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl Overlay for Subtitle {
    type Patch = SubtitlePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn start(&self) -> f64 {
        self.start
    }

    fn end(&self) -> f64 {
        self.end
    }

    fn set_window(&mut self, start: f64, end: f64) {
        self.start = start;
        self.end = end;
    }

    /// Half-open: visible at `start`, gone at `end`.
    fn is_active_at(&self, now: f64) -> bool {
        self.start <= now && now < self.end
    }

    fn apply(&mut self, patch: &SubtitlePatch) {
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(align) = patch.align {
            self.align = align;
        }
    }

    fn duplicated(&self) -> Self {
        let span = self.end - self.start;
        Self {
            id: String::new(),
            start: self.end,
            end: self.end + span,
            text: format!("{} (copy)", self.text),
            ..self.clone()
        }
    }
}

/// Demo content the editor opens with.
pub fn seed_subtitles() -> Vec<Subtitle> {
    vec![
        Subtitle::new(1.0, 4.0, "به ABBASAGHA خوش آمدید"),
        Subtitle::new(5.0, 8.0, "پلتفرم ویرایش ویدیوی حرفه‌ای"),
        Subtitle::new(9.0, 12.0, "Welcome to ABBASAGHA"),
    ]
}
