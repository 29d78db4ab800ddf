use serde::{Deserialize, Serialize};

use crate::types::overlay::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Text,
}

impl TrackKind {
    pub const ALL: [TrackKind; 4] = [
        TrackKind::Video,
        TrackKind::Audio,
        TrackKind::Subtitle,
        TrackKind::Text,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Subtitle => "Subtitle",
            TrackKind::Text => "Text",
        }
    }

    pub fn default_height(&self) -> f32 {
        match self {
            TrackKind::Subtitle | TrackKind::Text => 40.0,
            TrackKind::Video | TrackKind::Audio => 60.0,
        }
    }
}

/// A lane in the timeline. Display grouping only: toggling `enabled` dims the
/// lane and `locked` blocks edits from the UI, neither touches overlay data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub kind: TrackKind,
    pub enabled: bool,
    pub locked: bool,
    pub height: f32,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            enabled: true,
            locked: false,
            height: kind.default_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackList {
    pub tracks: Vec<Track>,
}

impl Default for TrackList {
    fn default() -> Self {
        Self {
            tracks: vec![
                Track::new("video-1", "Video", TrackKind::Video),
                Track::new("audio-1", "Audio", TrackKind::Audio),
                Track::new("subtitle-1", "Subtitles", TrackKind::Subtitle),
            ],
        }
    }
}

impl TrackList {
    pub fn add_track(&mut self, kind: TrackKind) -> &Track {
        let count = self.tracks.iter().filter(|t| t.kind == kind).count();
        let name = format!("{} {}", kind.label(), count + 1);
        let id = format!("{}-{}", kind.label().to_lowercase(), new_id());
        self.tracks.push(Track::new(id, name, kind));
        &self.tracks[self.tracks.len() - 1]
    }

    pub fn toggle_enabled(&mut self, track_id: &str) {
        if let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) {
            track.enabled = !track.enabled;
        }
    }

    pub fn toggle_locked(&mut self, track_id: &str) {
        if let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) {
            track.locked = !track.locked;
        }
    }

    /// First lane of a kind; the subtitle track view reads its flags.
    pub fn first_of(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn total_height(&self) -> f32 {
        self.tracks.iter().map(|t| t.height).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lanes() {
        let list = TrackList::default();
        assert_eq!(list.tracks.len(), 3);
        assert_eq!(list.tracks[2].kind, TrackKind::Subtitle);
        assert_eq!(list.tracks[2].height, 40.0);
        assert_eq!(list.total_height(), 160.0);
    }

    #[test]
    fn test_add_track_names_by_kind_count() {
        let mut list = TrackList::default();
        let name = list.add_track(TrackKind::Subtitle).name.clone();
        assert_eq!(name, "Subtitle 2");
        let text = list.add_track(TrackKind::Text).clone();
        assert_eq!(text.name, "Text 1");
        assert_eq!(text.height, 40.0);
        assert!(text.enabled && !text.locked);
    }

    #[test]
    fn test_toggles_ignore_unknown_id() {
        let mut list = TrackList::default();
        list.toggle_locked("subtitle-1");
        list.toggle_enabled("video-1");
        list.toggle_enabled("nope");
        assert!(list.first_of(TrackKind::Subtitle).unwrap().locked);
        assert!(!list.first_of(TrackKind::Video).unwrap().enabled);
        assert!(list.first_of(TrackKind::Audio).unwrap().enabled);
    }
}
