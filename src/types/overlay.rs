use uuid::Uuid;

/// A visual entity bound to a time window on the timeline.
///
/// The activity rule is per type: subtitles use a half-open window, free
/// text a closed one.
pub trait Overlay: Clone {
    /// Field-wise partial update; `None` fields are left untouched.
    type Patch;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn start(&self) -> f64;
    fn end(&self) -> f64;
    fn set_window(&mut self, start: f64, end: f64);
    fn is_active_at(&self, now: f64) -> bool;
    fn apply(&mut self, patch: &Self::Patch);
    /// Copy placed next to the original. The id is replaced by the store.
    fn duplicated(&self) -> Self;

    fn span(&self) -> f64 {
        self.end() - self.start()
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn label(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}
