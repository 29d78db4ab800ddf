/// Snapshot of the playback position handed to every time-dependent view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub playhead: f64,
    pub is_playing: bool,
    /// `None` until the media reports metadata.
    pub duration: Option<f64>,
    pub playback_rate: f64,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            playhead: 0.0,
            is_playing: false,
            duration: None,
            playback_rate: 1.0,
        }
    }

    /// Playhead as a fraction of the duration, if the duration is known.
    pub fn progress(&self) -> Option<f64> {
        crate::types::time::known_duration(self.duration).map(|d| (self.playhead / d).clamp(0.0, 1.0))
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_requires_duration() {
        let mut state = PlaybackState::new();
        state.playhead = 5.0;
        assert_eq!(state.progress(), None);
        state.duration = Some(20.0);
        assert_eq!(state.progress(), Some(0.25));
        state.duration = Some(0.0);
        assert_eq!(state.progress(), None);
    }
}
