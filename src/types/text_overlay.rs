use serde::{Deserialize, Serialize};

use crate::types::overlay::{Align, Overlay};

pub const DEFAULT_TEXT: &str = "New Text";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub left: f32,
    pub top: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: String,
    pub font_family: String,
    pub font_weight: String,
    pub align: Align,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 48.0,
            color: "#ffffff".to_string(),
            font_family: "Arial".to_string(),
            font_weight: "normal".to_string(),
            align: Align::Center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees, clockwise.
    pub angle: f32,
    pub opacity: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Animation {
    #[default]
    None,
    FadeIn,
    SlideUp,
    ScaleIn,
    BounceIn,
}

impl Animation {
    pub const ALL: [Animation; 5] = [
        Animation::None,
        Animation::FadeIn,
        Animation::SlideUp,
        Animation::ScaleIn,
        Animation::BounceIn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Animation::None => "None",
            Animation::FadeIn => "Fade In",
            Animation::SlideUp => "Slide Up",
            Animation::ScaleIn => "Scale In",
            Animation::BounceIn => "Bounce In",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualFlags {
    pub shadow: bool,
    pub stroke: Option<String>,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFlags {
    pub selectable: bool,
    pub moveable: bool,
    pub resizable: bool,
}

impl Default for InteractionFlags {
    fn default() -> Self {
        Self {
            selectable: true,
            moveable: true,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub id: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub position: Position,
    pub style: TextStyle,
    pub transform: Transform,
    pub animation: Animation,
    pub visual: VisualFlags,
    pub interaction: InteractionFlags,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, start: f64, end: f64, position: Position) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            start,
            end,
            position,
            style: TextStyle::default(),
            transform: Transform::default(),
            animation: Animation::None,
            visual: VisualFlags::default(),
            interaction: InteractionFlags::default(),
        }
    }
}

/// Partial update. Canvas manipulation, the style picker and keyboard nudges
/// each produce one of these per gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub text: Option<String>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub position: Option<Position>,
    pub style: Option<TextStyle>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub angle: Option<f32>,
    pub opacity: Option<f32>,
    pub animation: Option<Animation>,
    pub visual: Option<VisualFlags>,
    pub interaction: Option<InteractionFlags>,
}

impl TextPatch {
    pub fn position(left: f32, top: f32) -> Self {
        Self {
            position: Some(Position { left, top }),
            ..Default::default()
        }
    }
}

impl Overlay for TextOverlay {
    type Patch = TextPatch;

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

    /// Closed: still visible at `end`. Intentionally differs from subtitles.
    fn is_active_at(&self, now: f64) -> bool {
        self.start <= now && now <= self.end
    }

    fn apply(&mut self, patch: &TextPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(style) = &patch.style {
            self.style = style.clone();
        }
        if let Some(scale_x) = patch.scale_x {
            self.transform.scale_x = scale_x;
        }
        if let Some(scale_y) = patch.scale_y {
            self.transform.scale_y = scale_y;
        }
        if let Some(angle) = patch.angle {
            self.transform.angle = angle;
        }
        if let Some(opacity) = patch.opacity {
            self.transform.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(animation) = patch.animation {
            self.animation = animation;
        }
        if let Some(visual) = &patch.visual {
            self.visual = visual.clone();
        }
        if let Some(interaction) = patch.interaction {
            self.interaction = interaction;
        }
    }

    /// Same place as the original. Canvas duplicates are offset by the
    /// configured amount through `offset_copy` instead.
    fn duplicated(&self) -> Self {
        let mut copy = self.clone();
        copy.id = String::new();
        copy
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub preview: &'static str,
    pub font_size: f32,
    pub font_weight: &'static str,
    pub color: &'static str,
    pub font_family: &'static str,
}

impl StyleTemplate {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font_size: self.font_size,
            color: self.color.to_string(),
            font_family: self.font_family.to_string(),
            font_weight: self.font_weight.to_string(),
            align: Align::Center,
        }
    }
}

pub const STYLE_TEMPLATES: [StyleTemplate; 5] = [
    StyleTemplate {
        id: "headline",
        name: "Headline",
        preview: "BIG TITLE",
        font_size: 48.0,
        font_weight: "bold",
        color: "#ffffff",
        font_family: "Arial",
    },
    StyleTemplate {
        id: "subtitle",
        name: "Subtitle",
        preview: "Secondary text",
        font_size: 24.0,
        font_weight: "semibold",
        color: "#e5e5e5",
        font_family: "Arial",
    },
    StyleTemplate {
        id: "caption",
        name: "Caption",
        preview: "Small description",
        font_size: 16.0,
        font_weight: "normal",
        color: "#cccccc",
        font_family: "Arial",
    },
    StyleTemplate {
        id: "quote",
        name: "Quote",
        preview: "\"Inspirational quote\"",
        font_size: 32.0,
        font_weight: "medium",
        color: "#ffd700",
        font_family: "Times",
    },
    StyleTemplate {
        id: "callout",
        name: "Call Out",
        preview: "ATTENTION!",
        font_size: 36.0,
        font_weight: "bold",
        color: "#ff4444",
        font_family: "Arial",
    },
];

pub const FONTS: [&str; 9] = [
    "Arial",
    "Helvetica",
    "Times",
    "Georgia",
    "Verdana",
    "Impact",
    "Comic Sans MS",
    "Trebuchet MS",
    "Palatino",
];

pub const BRAND_COLORS: [&str; 10] = [
    "#ffffff", "#000000", "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff",
    "#ffa500", "#800080",
];

/// What the add-text panel hands to [`new_text_at`].
#[derive(Debug, Clone, PartialEq)]
pub enum TextSource<'a> {
    Template(&'a StyleTemplate),
    Custom { font_family: String, color: String },
}

/// Builds a free text anchored at `playhead`, centered in a video canvas of
/// `canvas` (width, height).
pub fn new_text_at(
    source: TextSource<'_>,
    animation: Animation,
    playhead: f64,
    span: f64,
    canvas: (f32, f32),
) -> TextOverlay {
    let (text, style) = match source {
        TextSource::Template(template) => (template.preview.to_string(), template.style()),
        TextSource::Custom { font_family, color } => (
            DEFAULT_TEXT.to_string(),
            TextStyle {
                font_family,
                color,
                ..TextStyle::default()
            },
        ),
    };
    let position = Position {
        left: (canvas.0 / 2.0).floor(),
        top: (canvas.1 / 2.0).floor(),
    };
    let mut overlay = TextOverlay::new(text, playhead, playhead + span, position);
    overlay.style = style;
    overlay.animation = animation;
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_interval_boundaries() {
        // Closed on purpose, see Subtitle::is_active_at for the half-open rule.
        let text = TextOverlay::new("t", 2.0, 5.0, Position::default());
        assert!(text.is_active_at(2.0));
        assert!(text.is_active_at(5.0));
        assert!(!text.is_active_at(5.0001));
        assert!(!text.is_active_at(1.999));
    }

    #[test]
    fn test_new_text_from_template() {
        let text = new_text_at(
            TextSource::Template(&STYLE_TEMPLATES[3]),
            Animation::FadeIn,
            4.0,
            3.0,
            (854.0, 480.0),
        );
        assert_eq!(text.text, "\"Inspirational quote\"");
        assert_eq!(text.start, 4.0);
        assert_eq!(text.end, 7.0);
        assert_eq!(text.position, Position { left: 427.0, top: 240.0 });
        assert_eq!(text.style.color, "#ffd700");
        assert_eq!(text.style.font_family, "Times");
        assert_eq!(text.animation, Animation::FadeIn);
    }

    #[test]
    fn test_new_custom_text() {
        let text = new_text_at(
            TextSource::Custom {
                font_family: "Impact".to_string(),
                color: "#00ff00".to_string(),
            },
            Animation::None,
            0.0,
            3.0,
            (854.0, 480.0),
        );
        assert_eq!(text.text, DEFAULT_TEXT);
        assert_eq!(text.style.font_size, 48.0);
        assert_eq!(text.style.font_family, "Impact");
    }

    #[test]
    fn test_duplicated_keeps_position() {
        let text = TextOverlay::new("t", 0.0, 3.0, Position { left: 100.0, top: 50.0 });
        let copy = text.duplicated();
        assert!(copy.id.is_empty());
        assert_eq!(copy.position, text.position);
        assert_eq!(copy.start, text.start);
    }

    #[test]
    fn test_opacity_patch_clamped() {
        let mut text = TextOverlay::new("t", 0.0, 3.0, Position::default());
        text.apply(&TextPatch {
            opacity: Some(3.0),
            ..Default::default()
        });
        assert_eq!(text.transform.opacity, 1.0);
    }
}
