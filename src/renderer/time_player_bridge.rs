use crate::renderer::time_source::{MediaElement, TimeSource};
use crate::renderer::waveform::{WaveformCursor, WaveformEvent};
use crate::types::playback_state::PlaybackState;
use crate::types::time::known_duration;

/// Kind of user input that moved the playhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    PointerDown,
    PointerMove,
    Click,
    Keyboard,
    Waveform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    Playback,
    Gesture(Gesture),
}

/// What every time-dependent view receives once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUpdate {
    pub now: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub origin: UpdateOrigin,
}

pub trait TimeView {
    fn on_time_update(&mut self, update: &TimeUpdate);
}

/// Connects the time source to the views that follow it.
///
/// Ticks flow down (media → views), gestures flow up (view → media). A frame
/// in which a gesture seeked skips the media reconcile, so a tick carrying the
/// media's pre-seek time cannot undo the seek.
pub struct SyncBridge<M: MediaElement> {
    source: TimeSource<M>,
    gesture: Option<Gesture>,
}

impl<M: MediaElement> SyncBridge<M> {
    pub fn new(media: M) -> Self {
        Self {
            source: TimeSource::new(media),
            gesture: None,
        }
    }

    pub fn source(&self) -> &TimeSource<M> {
        &self.source
    }

    pub fn media_mut(&mut self) -> &mut M {
        self.source.media_mut()
    }

    pub fn now(&self) -> f64 {
        self.source.now()
    }

    pub fn duration(&self) -> Option<f64> {
        self.source.duration()
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            playhead: self.source.now(),
            is_playing: self.source.is_playing(),
            duration: self.source.duration(),
            playback_rate: self.source.playback_rate(),
        }
    }

    /// Opens a new update. Call once per frame before any gesture handling.
    pub fn begin_frame(&mut self) {
        self.gesture = None;
    }

    /// Seek requested by the user. Writes straight to the time source and
    /// returns the clamped time.
    pub fn user_seek(&mut self, time: f64, gesture: Gesture) -> f64 {
        let stored = self.source.seek(time);
        log::debug!("{:?} seek to {:.3}s (requested {:.3}s)", gesture, stored, time);
        self.gesture = Some(gesture);
        stored
    }

    pub fn play(&mut self) {
        self.source.play();
    }

    pub fn pause(&mut self) {
        self.source.pause();
    }

    pub fn toggle_play(&mut self) {
        self.source.toggle();
    }

    pub fn on_waveform_event(&mut self, event: WaveformEvent) {
        match event {
            WaveformEvent::Seek(progress) => {
                if let Some(duration) = known_duration(self.source.duration()) {
                    self.user_seek(progress * duration, Gesture::Waveform);
                }
            }
            // The waveform follows us, never the other way round.
            WaveformEvent::TimeUpdate(_) => {}
            WaveformEvent::DurationChange(duration) => {
                self.source.on_duration_change(Some(duration));
            }
        }
    }

    /// Reads the media, reconciles "now" unless a gesture already wrote this
    /// frame, and notifies every view.
    pub fn tick(&mut self, views: &mut [&mut dyn TimeView]) -> TimeUpdate {
        if let Some(duration) = known_duration(self.source.media().duration()) {
            self.source.on_duration_change(Some(duration));
        }
        if self.gesture.is_none() {
            let reported = self.source.media().current_time();
            self.source.on_media_time_update(reported);
        }
        let update = TimeUpdate {
            now: self.source.now(),
            duration: self.source.duration(),
            playing: self.source.is_playing(),
            origin: self
                .gesture
                .map_or(UpdateOrigin::Playback, UpdateOrigin::Gesture),
        };
        for view in views.iter_mut() {
            view.on_time_update(&update);
        }
        update
    }
}

/// Keeps an external waveform cursor near the playhead.
pub struct WaveformLink<W: WaveformCursor> {
    cursor: W,
    tolerance: f64,
}

impl<W: WaveformCursor> WaveformLink<W> {
    pub fn new(cursor: W, tolerance: f64) -> Self {
        Self { cursor, tolerance }
    }

    pub fn cursor(&self) -> &W {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut W {
        &mut self.cursor
    }
}

impl<W: WaveformCursor> TimeView for WaveformLink<W> {
    fn on_time_update(&mut self, update: &TimeUpdate) {
        let Some(duration) = known_duration(update.duration) else {
            return;
        };
        if (self.cursor.current_time() - update.now).abs() > self.tolerance {
            self.cursor.seek_to(update.now / duration);
        }
    }
}
